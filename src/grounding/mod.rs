//! Grounding annotation for generated answers
//!
//! Given an answer and the grounding metadata the generation provider
//! returned with it, this module partitions the answer into an ordered,
//! non-overlapping sequence of plain and citation-annotated fragments.
//!
//! # Design Principles
//!
//! - **Reconstruction**: concatenating the fragments' text always yields
//!   the original answer, character for character.
//! - **Total**: the pipeline has no failure modes. Empty segments,
//!   out-of-range indices and absent metadata degrade to no-ops.
//! - **Renderer-agnostic**: fragments carry resolved source records and
//!   nothing else; HTML and terminal output live in [`crate::render`].
//!
//! # Example
//!
//! ```
//! use groundcite::grounding::{annotate, Fragment};
//! use groundcite::grounding::types::{GroundingChunk, GroundingSupport, Segment, WebSource};
//!
//! let chunks = vec![GroundingChunk {
//!     web: Some(WebSource { uri: "https://x".into(), title: Some("X".into()) }),
//! }];
//! let supports = vec![GroundingSupport {
//!     segment: Some(Segment { text: "sky is blue".into(), ..Default::default() }),
//!     grounding_chunk_indices: vec![0],
//!     ..Default::default()
//! }];
//!
//! let fragments = annotate("The Sky is Blue.", &supports, &chunks);
//! assert_eq!(fragments.len(), 3);
//! assert!(matches!(&fragments[1], Fragment::Citation { .. }));
//! ```

pub mod annotate;
pub mod matcher;
pub mod types;

pub use annotate::{annotate, annotate_answer, Fragment};
pub use matcher::{find_case_insensitive, split_matches, MatchRun};
pub use types::{
    GroundingChunk, GroundingMetadata, GroundingSupport, SearchEntryPoint, Segment, WebSource,
};
