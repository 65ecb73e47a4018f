//! Rendering adapters for the annotated fragment sequence.
//!
//! The grounding core is renderer-agnostic; these modules turn its output
//! into HTML for the web page and plain text for the terminal.

pub mod html;
pub mod text;

pub use html::{escape_html, render_fragments};
pub use text::render_text;
