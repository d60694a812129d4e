//! Summarization client abstraction and the Ollama-backed adapter.
//!
//! The pipeline treats the model as a black box: a function from text plus
//! advisory length bounds to a summary string. This module owns the HTTP
//! plumbing to a local Ollama runtime and the process-wide client cache, so
//! repeat requests reuse one client per model and the model stays resident
//! in the runtime between calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Model identifiers the tool is willing to select.
pub const ALLOWED_MODELS: [&str; 4] = ["llama3.2", "llama3.1", "mistral", "phi3"];

/// Whether `model` is on the allow-list; comparison ignores an Ollama tag suffix.
pub fn is_allowed_model(model: &str) -> bool {
    let base = model.split(':').next().unwrap_or(model);
    ALLOWED_MODELS.contains(&base)
}

/// Errors surfaced while attempting a summarization call.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// Provider was unreachable or the endpoint does not exist.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("model invocation failed: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Advisory length bounds passed to the model as generation constraints.
///
/// The model is not forced to honor them; whatever length it returns is
/// accepted.
#[derive(Debug, Clone, Copy)]
pub struct LengthBounds {
    /// Requested lower bound on summary length, in characters.
    pub min_length: usize,
    /// Requested upper bound on summary length, in characters.
    pub max_length: usize,
}

/// Interface implemented by summarization backends.
#[async_trait]
pub trait SummarizerClient: Send + Sync {
    /// Produce a summary of `text` within the advisory `bounds`.
    async fn summarize(&self, text: &str, bounds: LengthBounds)
    -> Result<String, SummarizationError>;
}

/// Summarizer backed by a local Ollama runtime.
pub struct OllamaSummarizer {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizer {
    /// Build a client for `model` served at `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent("docsum/summary")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn build_prompt(text: &str, bounds: LengthBounds) -> String {
        format!(
            "Write a concise summary of the following text. Keep the summary \
             between {} and {} characters and reply with the summary only.\n\n{}",
            bounds.min_length, bounds.max_length, text
        )
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizerClient for OllamaSummarizer {
    async fn summarize(
        &self,
        text: &str,
        bounds: LengthBounds,
    ) -> Result<String, SummarizationError> {
        let payload = json!({
            "model": self.model,
            "prompt": Self::build_prompt(text, bounds),
            "stream": false,
            "options": {
                // Lower temperature for deterministic summaries; num_predict
                // caps generation near the advisory maximum.
                "temperature": 0.1,
                "num_predict": bounds.max_length,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

/// Process-wide cache of summarizer clients, keyed by endpoint and model.
static CLIENTS: OnceLock<Mutex<HashMap<(String, String), Arc<OllamaSummarizer>>>> =
    OnceLock::new();

/// Fetch or lazily create the shared summarizer for `model` at `base_url`.
///
/// Clients are created once per (endpoint, model) pair and reused for the
/// process lifetime; there is no teardown beyond process exit.
pub fn get_summarizer(base_url: &str, model: &str) -> Arc<OllamaSummarizer> {
    let cache = CLIENTS.get_or_init(|| Mutex::new(HashMap::new()));
    let key = (base_url.to_string(), model.to_string());
    let mut guard = cache.lock().expect("summarizer cache poisoned");
    Arc::clone(
        guard
            .entry(key)
            .or_insert_with(|| Arc::new(OllamaSummarizer::new(base_url, model))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    const BOUNDS: LengthBounds = LengthBounds {
        min_length: 30,
        max_length: 130,
    };

    #[test]
    fn model_allow_list_ignores_tag_suffix() {
        assert!(is_allowed_model("llama3.2"));
        assert!(is_allowed_model("llama3.2:3b"));
        assert!(is_allowed_model("mistral:7b-instruct"));
        assert!(!is_allowed_model("gpt-4"));
    }

    #[test]
    fn cached_client_is_reused_per_model() {
        let first = get_summarizer("http://127.0.0.1:11434", "llama3.2");
        let second = get_summarizer("http://127.0.0.1:11434", "llama3.2");
        let other = get_summarizer("http://127.0.0.1:11434", "mistral");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn ollama_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let client = OllamaSummarizer::new(server.base_url(), "llama3.2");

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": " Summary text ",
                    "done": true
                }));
            })
            .await;

        let summary = client.summarize("Some document", BOUNDS).await.expect("summary");

        mock.assert();
        assert_eq!(summary, "Summary text");
    }

    #[tokio::test]
    async fn ollama_client_handles_error_status() {
        let server = MockServer::start_async().await;
        let client = OllamaSummarizer::new(server.base_url(), "llama3.2");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client
            .summarize("Some document", BOUNDS)
            .await
            .expect_err("error response");

        assert!(
            matches!(error, SummarizationError::GenerationFailed(ref message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn ollama_client_rejects_incomplete_response() {
        let server = MockServer::start_async().await;
        let client = OllamaSummarizer::new(server.base_url(), "llama3.2");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "partial",
                    "done": false
                }));
            })
            .await;

        let error = client
            .summarize("Some document", BOUNDS)
            .await
            .expect_err("incomplete response");

        assert!(matches!(error, SummarizationError::InvalidResponse(_)));
    }
}
