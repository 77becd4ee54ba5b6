//! Error types for fact extraction

use docket_oracle::CapabilityError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// External capability call failed
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Fact store error; unrecoverable for the segment
    #[error("Store error: {0}")]
    Store(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Oracle response could not be parsed
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
