//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for the generation providers that
//! produce grounded answers.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::grounding::GroundingMetadata;

// Re-export the Gemini generator
pub use gemini::GeminiGenerator;

/// A generated answer together with its grounding metadata
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    /// The answer text
    pub answer: String,

    /// Grounding metadata, when the provider found supporting sources
    pub grounding: Option<GroundingMetadata>,
}

/// Failures at the generation boundary.
///
/// The annotation core never sees these: it consumes only the success path.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// User-correctable input problem (empty query, query too long)
    #[error("{0}")]
    InvalidInput(String),

    /// Transient upstream failure (rate limiting, network fault, empty
    /// response); the caller should retry
    #[error("{0}")]
    Generation(String),

    /// Anything else
    #[error("{0}")]
    Unexpected(String),
}

/// Trait for answer generators
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable generator name
    fn name(&self) -> &str;

    /// Generate a grounded answer for a query
    async fn generate(&self, query: &str) -> Result<GeneratedAnswer, GenerateError>;
}
