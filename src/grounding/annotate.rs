//! Annotation pipeline
//!
//! Folds the support list over an evolving fragment sequence, partitioning
//! the answer into plain text and citation-annotated spans.
//!
//! # Design Decisions
//!
//! - **Fold, not mutation**: each support maps the whole sequence to a new
//!   one; no state is shared across invocations.
//! - **Citations are final**: once a span becomes a citation it is passed
//!   through untouched by later supports. Supports only ever search the
//!   remaining plain fragments, so citations never overlap.
//! - **Order of arrival wins**: supports are applied in list order. An
//!   earlier support can consume text a later, wider segment would have
//!   matched; the later support then simply finds nothing.
//! - **Malformed metadata is a no-op**: empty segments are skipped,
//!   out-of-range chunk indices are dropped from the source list, and the
//!   function never fails.

use serde::{Deserialize, Serialize};

use super::matcher;
use super::types::{GroundingChunk, GroundingMetadata, GroundingSupport, WebSource};

/// One contiguous piece of the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// Unannotated text, still eligible for matching by later supports
    Plain { text: String },
    /// A cited span carrying its resolved sources, in support order
    Citation { text: String, sources: Vec<WebSource> },
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Plain { text } => text,
            Fragment::Citation { text, .. } => text,
        }
    }

    pub fn is_citation(&self) -> bool {
        matches!(self, Fragment::Citation { .. })
    }

    fn plain(text: impl Into<String>) -> Self {
        Fragment::Plain { text: text.into() }
    }
}

/// Annotate `answer` with the supports and source chunks of its grounding
/// metadata.
///
/// Returns the ordered fragment sequence. Concatenating every fragment's
/// text reproduces `answer` exactly. When `supports` or `chunks` is empty
/// the whole answer comes back as a single plain fragment.
pub fn annotate(
    answer: &str,
    supports: &[GroundingSupport],
    chunks: &[GroundingChunk],
) -> Vec<Fragment> {
    if supports.is_empty() || chunks.is_empty() {
        return vec![Fragment::plain(answer)];
    }

    supports
        .iter()
        .fold(vec![Fragment::plain(answer)], |fragments, support| {
            apply_support(fragments, support, chunks)
        })
}

/// Annotate using optional metadata, falling back to a single plain
/// fragment when none was returned by the provider.
pub fn annotate_answer(answer: &str, metadata: Option<&GroundingMetadata>) -> Vec<Fragment> {
    match metadata {
        Some(md) => annotate(answer, &md.grounding_supports, &md.grounding_chunks),
        None => vec![Fragment::plain(answer)],
    }
}

/// Apply one support to the sequence: re-scan every plain fragment, pass
/// citations through unchanged.
fn apply_support(
    fragments: Vec<Fragment>,
    support: &GroundingSupport,
    chunks: &[GroundingChunk],
) -> Vec<Fragment> {
    let Some(segment_text) = support.segment_text() else {
        return fragments;
    };

    let sources = resolve_sources(&support.grounding_chunk_indices, chunks);

    let mut next = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match fragment {
            Fragment::Citation { .. } => next.push(fragment),
            Fragment::Plain { text } => {
                for run in matcher::split_matches(&text, segment_text) {
                    if run.is_match {
                        next.push(Fragment::Citation {
                            text: run.text,
                            sources: sources.clone(),
                        });
                    } else if !run.text.is_empty() {
                        next.push(Fragment::Plain { text: run.text });
                    }
                }
            }
        }
    }
    next
}

/// Resolve chunk indices to source records.
///
/// Indices with no corresponding chunk, and chunks without a web record,
/// are dropped silently. Duplicate indices are kept in their original
/// order.
fn resolve_sources(indices: &[usize], chunks: &[GroundingChunk]) -> Vec<WebSource> {
    indices
        .iter()
        .filter_map(|&index| chunks.get(index).and_then(|chunk| chunk.web.clone()))
        .collect()
}
