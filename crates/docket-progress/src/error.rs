//! Error types for progress streaming

use thiserror::Error;

/// Errors that can occur on the progress bus
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    /// No stream exists for the given case and production. Also returned
    /// when the caller's case does not own the stream; existence is never
    /// revealed across cases.
    #[error("No progress stream for this case and production")]
    UnknownStream,

    /// The stream already reached a terminal state
    #[error("Stream is terminal; no further events accepted")]
    Terminal,

    /// A stream for this case and production already exists
    #[error("Stream already open for this production")]
    AlreadyOpen,
}
