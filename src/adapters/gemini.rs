//! Gemini client for grounded answer generation.
//!
//! Calls `models/{model}:generateContent` with the `google_search` tool
//! enabled, so the provider retrieves web sources and returns grounding
//! metadata alongside the answer text.
//!
//! Endpoint: POST {base}/models/{model}:generateContent
//! Auth: x-goog-api-key header

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{GenerateError, GeneratedAnswer, Generator};
use crate::grounding::GroundingMetadata;

/// Maximum accepted query length, in characters
pub const MAX_QUERY_CHARS: usize = 1000;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Generator backed by the Gemini generateContent API
pub struct GeminiGenerator {
    base_url: String,
    model: String,
    api_key: String,
    max_query_chars: usize,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiGenerator {
    /// Create a new generator
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            api_key,
            max_query_chars: MAX_QUERY_CHARS,
            client,
        })
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reject queries the provider should never see
    fn validate_query(&self, query: &str) -> Result<(), GenerateError> {
        if query.trim().is_empty() {
            return Err(GenerateError::InvalidInput(
                "Query cannot be empty".to_string(),
            ));
        }
        if query.chars().count() > self.max_query_chars {
            return Err(GenerateError::InvalidInput(format!(
                "Query is too long. Maximum length is {} characters",
                self.max_query_chars
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, query: &str) -> Result<GeneratedAnswer, GenerateError> {
        self.validate_query(query)?;

        let prompt = format!("Answer the following question concisely: {}", query.trim());
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GenerateError::Generation(
                "Rate limit exceeded. Please try again later.".to_string(),
            ));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerateError::Unexpected(format!(
                "Generation provider returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerateError::Unexpected(format!("Failed to parse provider response: {e}"))
        })?;

        extract_answer(parsed)
    }
}

fn map_transport_error(error: reqwest::Error) -> GenerateError {
    if error.is_timeout() || error.is_connect() {
        GenerateError::Generation(
            "Network error occurred. Please check your connection.".to_string(),
        )
    } else {
        GenerateError::Unexpected(format!("Request to generation provider failed: {error}"))
    }
}

/// Pull the answer text and grounding metadata out of the first candidate
fn extract_answer(response: GenerateContentResponse) -> Result<GeneratedAnswer, GenerateError> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        GenerateError::Generation("No response received from the model".to_string())
    })?;

    let answer: String = candidate
        .content
        .unwrap_or_default()
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if answer.is_empty() {
        return Err(GenerateError::Generation(
            "No response received from the model".to_string(),
        ));
    }

    Ok(GeneratedAnswer {
        answer,
        grounding: candidate.grounding_metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> GeminiGenerator {
        GeminiGenerator::new(
            "test-key".to_string(),
            "gemini-2.0-flash-001".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_query_rejected() {
        let g = generator();
        let err = g.validate_query("   ").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidInput(_)));
    }

    #[test]
    fn test_over_length_query_rejected() {
        let g = generator();
        let long = "x".repeat(MAX_QUERY_CHARS + 1);
        let err = g.validate_query(&long).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidInput(_)));

        // At the limit is fine
        let exact = "x".repeat(MAX_QUERY_CHARS);
        assert!(g.validate_query(&exact).is_ok());
    }

    #[test]
    fn test_extract_answer_with_grounding() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "The sky is blue"}, {"text": " today."}]},
                "groundingMetadata": {
                    "groundingChunks": [{"web": {"uri": "https://x", "title": "X"}}],
                    "groundingSupports": [{
                        "segment": {"text": "sky is blue"},
                        "groundingChunkIndices": [0]
                    }]
                }
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let generated = extract_answer(parsed).unwrap();

        assert_eq!(generated.answer, "The sky is blue today.");
        let grounding = generated.grounding.unwrap();
        assert_eq!(grounding.grounding_chunks.len(), 1);
        assert_eq!(grounding.grounding_supports.len(), 1);
    }

    #[test]
    fn test_extract_answer_without_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let err = extract_answer(parsed).unwrap_err();
        assert!(matches!(err, GenerateError::Generation(_)));
    }

    #[test]
    fn test_extract_answer_with_empty_text() {
        let raw = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let err = extract_answer(parsed).unwrap_err();
        assert!(matches!(err, GenerateError::Generation(_)));
    }

    #[tokio::test]
    async fn test_connect_failure_maps_to_transient() {
        // Port 1 refuses connections; the failure must surface as a
        // retryable generation error, not Unexpected
        let g = generator().with_base_url("http://127.0.0.1:1");
        let err = g.generate("why is the sky blue?").await.unwrap_err();
        assert!(matches!(err, GenerateError::Generation(_)));
    }
}
