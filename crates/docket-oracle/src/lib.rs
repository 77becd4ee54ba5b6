//! Docket Capability Boundary
//!
//! Every external capability the pipeline consumes — the LLM-style
//! detection/classification/extraction oracle and page-level text — is
//! reached through the async traits in this crate, and every failure is
//! classified at the boundary into a tagged [`CapabilityError`] so
//! downstream code never branches on ad hoc response shapes.
//!
//! # Providers
//!
//! - [`MockClient`]: deterministic scripted client for tests
//! - [`OllamaClient`]: local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use docket_oracle::{LlmClient, MockClient};
//!
//! # tokio_test::block_on(async {
//! let client = MockClient::new("[]");
//! let response = client.generate("any prompt").await.unwrap();
//! assert_eq!(response, "[]");
//! # });
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod pages;
pub mod retry;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaClient;
pub use pages::{DirectoryPageSource, InMemoryPageSource};

/// Classified failure of an external capability call.
///
/// Transient failures (timeouts, rate limits, connection resets) are
/// eligible for bounded retry; permanent failures (malformed input,
/// unsupported content) are not and mark the window or segment degraded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Retryable: timeout, rate limit, transport failure
    #[error("transient capability failure: {0}")]
    Transient(String),

    /// Not retryable: the request itself cannot succeed
    #[error("permanent capability failure: {0}")]
    Permanent(String),
}

impl CapabilityError {
    /// Whether a bounded retry could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, CapabilityError::Transient(_))
    }
}

/// Text-generation capability: the opaque oracle behind boundary
/// detection, segment classification, and fact mining.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError>;
}

/// Page-level text capability (OCR or native extraction, external)
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Number of pages available, 1-based page space `[1, total_pages]`
    fn total_pages(&self) -> u32;

    /// Text of one page
    async fn page_text(&self, page: u32) -> Result<String, CapabilityError>;
}

type Handler = dyn Fn(&str) -> Result<String, CapabilityError> + Send + Sync;

/// Deterministic mock LLM client for tests.
///
/// Resolution order per prompt: a scripted exact-prompt response, then the
/// handler closure (if set), then the default response. Tracks call
/// counts and supports error injection.
///
/// # Examples
///
/// ```
/// use docket_oracle::{LlmClient, MockClient};
///
/// # tokio_test::block_on(async {
/// let mut client = MockClient::new("default");
/// client.add_response("ping", "pong");
/// assert_eq!(client.generate("ping").await.unwrap(), "pong");
/// assert_eq!(client.generate("other").await.unwrap(), "default");
/// assert_eq!(client.call_count(), 2);
/// # });
/// ```
#[derive(Clone)]
pub struct MockClient {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Result<String, CapabilityError>>>>,
    handler: Option<Arc<Handler>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockClient {
    /// Create a mock returning `response` for every prompt
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            handler: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a mock whose responses are computed from the prompt
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Result<String, CapabilityError> + Send + Sync + 'static,
    {
        Self {
            default_response: String::new(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            handler: Some(Arc::new(handler)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Script a response for one exact prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), Ok(response.into()));
    }

    /// Script a failure for one exact prompt
    pub fn add_error(&mut self, prompt: impl Into<String>, error: CapabilityError) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), Err(error));
    }

    /// Number of `generate` calls so far
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(scripted) = self.responses.lock().unwrap().get(prompt) {
            return scripted.clone();
        }
        if let Some(handler) = &self.handler {
            return handler(prompt);
        }
        Ok(self.default_response.clone())
    }
}
