//! Error types for the pipeline

use docket_extractor::ExtractorError;
use docket_progress::ProgressError;
use docket_segmenter::SegmenterError;
use thiserror::Error;

/// Errors that can occur while orchestrating a production run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Segmentation error; invariant violations are fatal to the run
    #[error("Segmentation error: {0}")]
    Segmenter(#[from] SegmenterError),

    /// Fact extraction error
    #[error("Extraction error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Progress stream error
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// Store error; unrecoverable for the run
    #[error("Store error: {0}")]
    Store(String),

    /// Page source failure that survived retry
    #[error("Page source error: {0}")]
    PageSource(String),

    /// No run registered for the given case and production. Also
    /// returned when the caller's case does not own the run.
    #[error("No run for this case and production")]
    UnknownRun,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Runtime plumbing failure (task join, semaphore)
    #[error("Internal error: {0}")]
    Internal(String),
}
