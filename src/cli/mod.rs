//! Command-line interface.
//!
//! - `serve`: run the HTTP service
//! - `ask`: one-shot query, annotated output on stdout
//! - `annotate`: render a saved chat response without calling the provider

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::adapters::{GeminiGenerator, Generator};
use crate::config::{self, ResolvedConfig};
use crate::grounding::{annotate_answer, Fragment, GroundingMetadata};
use crate::render;
use crate::web::{self, Engine};

#[derive(Parser)]
#[command(name = "groundcite", version, about = "Grounded Q&A with inline citation annotation")]
pub struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Config file path (default: discover .groundcite/config.yaml upward)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Ask one question and print the annotated answer
    Ask {
        /// The question
        query: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Annotate a saved chat response (no provider call)
    Annotate {
        /// JSON file holding {"answerText": ..., "groundingMetadata": ...}
        #[arg(long)]
        input_file: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

/// The `/api/chat` response shape, as saved to disk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedResponse {
    answer_text: String,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load()?,
        };

        match self.cmd {
            Commands::Serve { bind } => {
                let engine = Engine {
                    generator: Arc::new(build_generator(&cfg)?),
                };
                web::serve(engine, bind.unwrap_or(cfg.bind)).await
            }

            Commands::Ask { query, format } => {
                let generator = build_generator(&cfg)?;
                let generated = generator.generate(&query).await?;
                let fragments = annotate_answer(&generated.answer, generated.grounding.as_ref());
                print_fragments(&fragments, format)
            }

            Commands::Annotate { input_file, format } => {
                let content = std::fs::read_to_string(&input_file)
                    .with_context(|| format!("Failed to read {}", input_file.display()))?;
                let saved: SavedResponse = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", input_file.display()))?;
                let fragments =
                    annotate_answer(&saved.answer_text, saved.grounding_metadata.as_ref());
                print_fragments(&fragments, format)
            }
        }
    }
}

fn build_generator(cfg: &ResolvedConfig) -> Result<GeminiGenerator> {
    let api_key = cfg.require_api_key()?.to_string();
    GeminiGenerator::new(api_key, cfg.model.clone(), cfg.request_timeout)
}

fn print_fragments(fragments: &[Fragment], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", render::render_text(fragments)),
        OutputFormat::Html => println!("{}", render::render_fragments(fragments)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(fragments)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_response_parses_chat_shape() {
        let raw = r#"{
            "answerText": "The sky is blue.",
            "answerHtml": "<p>ignored</p>",
            "groundingMetadata": {
                "groundingChunks": [{"web": {"uri": "https://x"}}],
                "groundingSupports": [{
                    "segment": {"text": "sky is blue"},
                    "groundingChunkIndices": [0]
                }]
            }
        }"#;
        let saved: SavedResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(saved.answer_text, "The sky is blue.");
        assert!(saved.grounding_metadata.is_some());
    }

    #[test]
    fn test_saved_response_metadata_optional() {
        let saved: SavedResponse =
            serde_json::from_str(r#"{"answerText": "plain"}"#).unwrap();
        assert!(saved.grounding_metadata.is_none());
    }
}
