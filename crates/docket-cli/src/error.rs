//! Error types for the CLI application

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] docket_pipeline::PipelineError),

    /// Progress stream error
    #[error("Progress error: {0}")]
    Progress(#[from] docket_progress::ProgressError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] docket_store::StoreError),

    /// Page source error
    #[error("Page source error: {0}")]
    Pages(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
