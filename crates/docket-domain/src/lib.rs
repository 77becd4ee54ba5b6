//! Docket Domain Layer
//!
//! Core domain model for Docket: the entities and invariants of splitting a
//! discovery production into logical documents and extracting facts from
//! them, plus the trait seams the infrastructure layers implement.
//!
//! ## Key Concepts
//!
//! - **Production**: one large paginated input that contains many logical
//!   documents concatenated together
//! - **Segment**: one finalized logical document, defined by an inclusive
//!   page range; the segments of a production partition its pages exactly
//! - **Fact**: an atomic extracted statement attributed to a segment
//! - **Case**: the tenant-isolation unit; every entity carries a `CaseId`
//!   and no data may cross case boundaries
//! - **ProgressEvent**: an entry in the ordered, append-only per-production
//!   event stream
//!
//! ## Architecture
//!
//! This crate has no external dependencies beyond `uuid`:
//! - Pure domain types and invariants only
//! - Store implementations live in `docket-store`
//! - Capability clients (LLM, page text) live in `docket-oracle`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod event;
pub mod fact;
pub mod ids;
pub mod pages;
pub mod production;
pub mod segment;
pub mod traits;

// Re-exports for convenience
pub use boundary::BoundaryCandidate;
pub use event::{ProgressEvent, ProgressEventKind, RunState};
pub use fact::{ExtractedEntity, EntityKind, Fact, FactCategory};
pub use ids::{CaseId, FactId, ProductionId, SegmentId};
pub use pages::{verify_partition, PageRange};
pub use production::{Confidentiality, Production};
pub use segment::{DocumentType, IdRange, Segment};
