//! Ollama client
//!
//! Integration with a local Ollama instance. One HTTP attempt per
//! `generate` call; retry policy belongs to the caller (see
//! [`crate::retry::with_retry`]), which keeps the retry budget explicit
//! instead of hidden inside the transport.

use crate::{CapabilityError, LlmClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Ollama API client
///
/// # Examples
///
/// ```no_run
/// use docket_oracle::OllamaClient;
///
/// let client = OllamaClient::new("http://localhost:11434", "llama3");
/// ```
pub struct OllamaClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaClient {
    /// Create a client against `endpoint` using `model`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit per-call timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client,
        }
    }

    /// Create a client against the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError> {
        let url = format!("{}/api/generate", self.endpoint);

        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // Timeouts and connection failures are retryable
                CapabilityError::Transient(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if status.is_success() {
            let parsed: GenerateResponse = response.json().await.map_err(|e| {
                CapabilityError::Permanent(format!("unparseable response: {}", e))
            })?;
            return Ok(parsed.response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(CapabilityError::Permanent(format!(
                "model '{}' not available",
                self.model
            )))
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(CapabilityError::Transient(format!("HTTP {}: {}", status, text)))
        } else {
            Err(CapabilityError::Permanent(format!("HTTP {}: {}", status, text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new("http://localhost:11434", "llama3");
        assert_eq!(client.endpoint, "http://localhost:11434");
        assert_eq!(client.model, "llama3");
    }

    #[test]
    fn test_default_endpoint() {
        let client = OllamaClient::default_endpoint("mistral");
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_connection_failure_is_transient() {
        // Port 9 (discard) is not running an Ollama server
        let client = OllamaClient::with_timeout(
            "http://127.0.0.1:9",
            "llama3",
            Duration::from_millis(200),
        );

        let err = client.generate("test").await.unwrap_err();
        assert!(err.is_transient(), "got: {:?}", err);
    }
}
