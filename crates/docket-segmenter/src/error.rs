//! Error types for segmentation

use docket_oracle::CapabilityError;
use thiserror::Error;

/// Errors that can occur during segmentation
#[derive(Error, Debug)]
pub enum SegmenterError {
    /// External capability call failed
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Oracle response could not be parsed
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// The merged segments do not partition the page run. Fatal: nothing
    /// derived from a broken partition may be persisted.
    #[error("Partition invariant violated: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
