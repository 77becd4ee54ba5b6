//! Progress events: the ordered, append-only per-production stream
//!
//! Events are scoped to a `(case_id, production_id)` stream and ordered by
//! `sequence` within that stream. Cross-stream ordering is not defined.
//! Payloads are small and typed; subscribers fetch full entities through
//! the case-scoped read APIs.

use crate::ids::{CaseId, FactId, ProductionId, SegmentId};
use crate::pages::PageRange;

/// Lifecycle state of a production run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Run registered but no events emitted yet
    #[default]
    NotStarted,
    /// `started` emitted; processing underway
    Running,
    /// Terminal: all segments finalized
    Completed,
    /// Terminal: run aborted by an unrecoverable failure
    Failed,
    /// Terminal: run cancelled by the case owner
    Cancelled,
}

impl RunState {
    /// Whether the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Failed | RunState::Cancelled
        )
    }
}

/// What happened, with a small typed payload
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEventKind {
    /// Processing has begun
    Started {
        /// Total pages in the production
        total_pages: u32,
    },
    /// A finalized segment was identified and persisted
    SegmentFound {
        /// Segment ordinal (0-based, page order)
        ordinal: u32,
        /// Segment identifier
        segment_id: SegmentId,
        /// Inclusive page range
        pages: PageRange,
        /// Classified type, stable string form
        document_type: String,
    },
    /// Fact extraction for a segment started chunking
    Chunking {
        /// Segment ordinal
        ordinal: u32,
        /// Number of chunks the segment text was split into
        chunks: usize,
    },
    /// One new (non-duplicate) fact was persisted
    FactExtracted {
        /// Segment ordinal
        ordinal: u32,
        /// Fact identifier
        fact_id: FactId,
    },
    /// All extraction for a segment finished
    SegmentCompleted {
        /// Segment ordinal
        ordinal: u32,
        /// Facts persisted for this segment
        facts_persisted: usize,
        /// Candidates dropped as duplicates
        duplicates_dropped: usize,
    },
    /// Terminal: the whole production finished successfully
    Completed {
        /// Number of segments finalized
        segments: usize,
    },
    /// Terminal: the run was cancelled; persisted data is retained
    Cancelled,
    /// Terminal: the run failed; persisted data is retained
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl ProgressEventKind {
    /// Whether this event terminates the stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEventKind::Completed { .. }
                | ProgressEventKind::Cancelled
                | ProgressEventKind::Error { .. }
        )
    }

    /// Stable name of the event kind, for logs and the CLI
    pub fn name(&self) -> &'static str {
        match self {
            ProgressEventKind::Started { .. } => "started",
            ProgressEventKind::SegmentFound { .. } => "segment_found",
            ProgressEventKind::Chunking { .. } => "chunking",
            ProgressEventKind::FactExtracted { .. } => "fact_extracted",
            ProgressEventKind::SegmentCompleted { .. } => "segment_completed",
            ProgressEventKind::Completed { .. } => "completed",
            ProgressEventKind::Cancelled => "cancelled",
            ProgressEventKind::Error { .. } => "error",
        }
    }
}

/// One entry in a production's progress stream
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Owning case
    pub case_id: CaseId,
    /// Production this event belongs to
    pub production_id: ProductionId,
    /// Position in the stream; strictly increasing per stream
    pub sequence: u64,
    /// What happened
    pub kind: ProgressEventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!RunState::NotStarted.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Cancelled.is_terminal());
    }

    #[test]
    fn test_terminal_events() {
        assert!(ProgressEventKind::Completed { segments: 3 }.is_terminal());
        assert!(ProgressEventKind::Cancelled.is_terminal());
        assert!(ProgressEventKind::Error {
            message: "store unreachable".to_string()
        }
        .is_terminal());
        assert!(!ProgressEventKind::Started { total_pages: 10 }.is_terminal());
        assert!(!ProgressEventKind::Chunking {
            ordinal: 0,
            chunks: 4
        }
        .is_terminal());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(
            ProgressEventKind::Started { total_pages: 1 }.name(),
            "started"
        );
        assert_eq!(ProgressEventKind::Cancelled.name(), "cancelled");
    }
}
