//! groundcite - Grounded Q&A with inline citation annotation
//!
//! Asks a search-grounded generation model a question, then renders the
//! answer with citation widgets over the spans the provider's grounding
//! metadata backs with web sources. Unsupported spans stay plain text.
//!
//! # Architecture
//!
//! The core is a pure annotation pipeline:
//! - The answer starts as one plain fragment
//! - Each grounding support re-scans the remaining plain fragments for its
//!   segment text and turns matches into citation fragments
//! - Citations are final; concatenating all fragments reproduces the
//!   answer exactly
//!
//! # Modules
//!
//! - `adapters`: Generation providers (Gemini)
//! - `grounding`: The annotation core (matcher, pipeline, wire types)
//! - `render`: HTML and terminal output for the fragment sequence
//! - `web`: HTTP service (chat endpoint, page shell)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the service
//! GEMINI_API_KEY=... groundcite serve
//!
//! # One-shot question in the terminal
//! GEMINI_API_KEY=... groundcite ask "Why is the sky blue?"
//!
//! # Re-render a saved response offline
//! groundcite annotate --input-file response.json --format html
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod grounding;
pub mod render;
pub mod web;

// Re-export main types at crate root for convenience
pub use adapters::{GeminiGenerator, GenerateError, GeneratedAnswer, Generator};
pub use grounding::{annotate, annotate_answer, Fragment, GroundingMetadata, WebSource};
pub use render::{render_fragments, render_text};
