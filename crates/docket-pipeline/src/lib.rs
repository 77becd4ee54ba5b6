//! Docket Pipeline
//!
//! End-to-end orchestration of a production run: boundary detection over
//! overlapping windows, merge into a verified partition, classification,
//! and concurrent fact extraction, with progress streamed in page order
//! on a per-(case, production) bus.
//!
//! Concurrency is bounded per phase. Cancellation is cooperative: the
//! [`RunRegistry`] flips a flag the run polls between units of work, and
//! everything persisted before the flag was observed stays persisted.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod flush;
pub mod orchestrator;
pub mod registry;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use flush::OrdinalFlusher;
pub use orchestrator::{PipelineOrchestrator, RunReport};
pub use registry::RunRegistry;
