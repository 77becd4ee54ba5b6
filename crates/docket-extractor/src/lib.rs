//! Docket Fact Extraction
//!
//! Mines atomic facts from finalized segments:
//!
//! 1. [`chunking`] splits segment text into overlapping bounded chunks.
//! 2. [`extractor`] asks the oracle for candidate facts per chunk and
//!    validates each candidate independently.
//! 3. [`patterns`] attaches deterministically matched entities (dates,
//!    money, citations, Bates numbers).
//! 4. [`dedup`] drops candidates that duplicate an already-persisted
//!    fact of the same case; survivors are persisted.
//!
//! Chunk failures degrade the segment, they do not fail it: facts from
//! healthy chunks are kept and the failure count is reported.

#![warn(missing_docs)]

pub mod chunking;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod patterns;
pub mod prompt;
pub mod types;

pub use config::ExtractorConfig;
pub use dedup::DedupDecision;
pub use error::ExtractorError;
pub use extractor::{FactExtractor, SegmentExtraction};
pub use types::FactCandidate;
