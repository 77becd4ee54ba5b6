//! Docket Segmentation
//!
//! Turns a production's continuous page run into a gap-free sequence of
//! logical documents:
//!
//! 1. [`windower`] covers `[1, total_pages]` with overlapping analysis
//!    windows.
//! 2. [`detector`] asks the oracle for boundary candidates per window.
//! 3. [`merger`] coalesces candidates across windows, applies the
//!    confidence threshold, and cuts the page run into a verified
//!    partition.
//! 4. [`classifier`] assigns each finalized segment a document type,
//!    title, and stamped identifier range.
//!
//! Detection and classification are best-effort: a failed window yields
//! zero candidates, a failed classification yields `Unclassified`. The
//! partition invariant is the only hard failure in this crate.

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod merger;
pub mod parser;
pub mod prompt;
pub mod windower;

pub use classifier::{Classification, SegmentClassifier};
pub use config::SegmenterConfig;
pub use detector::BoundaryDetector;
pub use error::SegmenterError;
pub use merger::{build_partition, merge, needs_fallback, MergedBoundary};
pub use windower::{windows, PageWindow};
