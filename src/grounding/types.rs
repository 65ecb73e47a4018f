//! Grounding metadata wire types
//!
//! These types mirror the grounding metadata shape returned by the
//! generation provider (camelCase on the wire). Every field is tolerant of
//! absence: partially populated metadata must deserialize and flow through
//! the pipeline as a no-op, never as an error.

use serde::{Deserialize, Serialize};
use url::Url;

/// Grounding metadata attached to one generated answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingMetadata {
    /// Retrieved source records, citable by index
    pub grounding_chunks: Vec<GroundingChunk>,
    /// Claims that specific answer segments are backed by sources
    pub grounding_supports: Vec<GroundingSupport>,
    /// Search queries the provider issued while grounding
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub web_search_queries: Vec<String>,
    /// Provider-rendered search suggestion card
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_entry_point: Option<SearchEntryPoint>,
}

impl GroundingMetadata {
    /// True when there is nothing to annotate with
    pub fn is_empty(&self) -> bool {
        self.grounding_chunks.is_empty() || self.grounding_supports.is_empty()
    }
}

/// One retrieved source record. Identified by its position in
/// [`GroundingMetadata::grounding_chunks`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingChunk {
    /// The web reference; absent for non-web chunk kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}

/// A single retrieved web reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl WebSource {
    /// Title to display: the record's title, or the URI host when the title
    /// is missing or empty, or the raw URI as a last resort.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref() {
            if !title.trim().is_empty() {
                return title.to_string();
            }
        }
        host_of(&self.uri).unwrap_or_else(|| self.uri.clone())
    }
}

fn host_of(uri: &str) -> Option<String> {
    Url::parse(uri)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// A claim that one literal text segment of the answer is backed by the
/// sources at the given chunk indices. List order is processing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingSupport {
    /// The answer segment this support refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    /// Positions into `grounding_chunks`; duplicates and out-of-range
    /// values are allowed on the wire
    pub grounding_chunk_indices: Vec<usize>,
    /// Per-index confidence, when the provider reports it
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub confidence_scores: Vec<f64>,
}

impl GroundingSupport {
    /// The literal segment text, or None when absent/empty
    pub fn segment_text(&self) -> Option<&str> {
        self.segment
            .as_ref()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
    }
}

/// The provider's segment descriptor. Offsets are carried verbatim but
/// matching is textual, so they are not relied upon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Segment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,
}

/// Provider-rendered HTML card with search suggestions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchEntryPoint {
    pub rendered_content: String,
}
