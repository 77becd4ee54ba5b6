//! Trait seams between domain logic and infrastructure
//!
//! The store traits are the isolation boundary: every operation takes the
//! caller's authorized `CaseId` and implementations must refuse when it
//! does not match the entity's owning case, regardless of what upstream
//! code did. Enforcement lives in the store so an application-layer
//! mistake cannot leak data across cases.

use crate::fact::Fact;
use crate::ids::{CaseId, ProductionId, SegmentId};
use crate::segment::Segment;

/// Storage for finalized segments
///
/// Implemented by the infrastructure layer (docket-store)
pub trait SegmentStore {
    /// Error type for store operations
    type Error;

    /// Persist a finalized segment. Must refuse if `authorized` does not
    /// match `segment.case_id`.
    fn persist_segment(&mut self, authorized: CaseId, segment: Segment)
        -> Result<SegmentId, Self::Error>;

    /// Segments of a production in ordinal order, scoped to `authorized`
    fn segments_for_production(
        &self,
        authorized: CaseId,
        production_id: ProductionId,
    ) -> Result<Vec<Segment>, Self::Error>;

    /// Fetch one segment, scoped to `authorized`
    fn get_segment(
        &self,
        authorized: CaseId,
        id: SegmentId,
    ) -> Result<Option<Segment>, Self::Error>;
}

/// Storage and similarity search for extracted facts
///
/// Implemented by the infrastructure layer (docket-store)
pub trait FactStore {
    /// Error type for store operations
    type Error;

    /// Persist a new fact. Must refuse if `authorized` does not match
    /// `fact.case_id`.
    fn persist_fact(&mut self, authorized: CaseId, fact: Fact) -> Result<(), Self::Error>;

    /// Facts extracted from one segment, scoped to `authorized`
    fn facts_for_segment(
        &self,
        authorized: CaseId,
        segment_id: SegmentId,
    ) -> Result<Vec<Fact>, Self::Error>;

    /// All facts of the case
    fn facts_for_case(&self, authorized: CaseId) -> Result<Vec<Fact>, Self::Error>;

    /// Facts of the case whose embedding similarity to `query` is at or
    /// above `threshold`, most similar first, at most `limit` results.
    /// Similarity never crosses cases: the search space is the case's own
    /// facts by construction.
    fn search_similar(
        &self,
        authorized: CaseId,
        query: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<(Fact, f32)>, Self::Error>;
}
