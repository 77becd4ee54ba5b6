//! Docket Progress Streaming
//!
//! Ordered, per-production progress event streams. Each
//! `(case_id, production_id)` pair owns an append-only log with
//! monotonically increasing sequence numbers; subscribers receive the
//! backlog plus live events, and reconnecting subscribers replay from
//! their last seen sequence. Streams are keyed by the caller's
//! authorized case.

#![warn(missing_docs)]

pub mod bus;
pub mod error;

pub use bus::ProgressBus;
pub use error::ProgressError;
