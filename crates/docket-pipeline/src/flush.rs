//! Page-ordered flushing of per-segment event batches
//!
//! Extraction runs concurrently and finishes in arbitrary order, but the
//! progress stream must report segments in page order. Each segment's
//! events are batched by the worker and submitted here; the flusher
//! releases batches strictly by ordinal, holding later batches until the
//! earlier ones arrive.

use docket_domain::ProgressEventKind;
use std::collections::BTreeMap;

/// Reorders per-segment event batches into ordinal order
#[derive(Debug, Default)]
pub struct OrdinalFlusher {
    next: u32,
    pending: BTreeMap<u32, Vec<ProgressEventKind>>,
}

impl OrdinalFlusher {
    /// Create a flusher expecting ordinals from 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit one segment's batch. Returns every event now ready to
    /// publish, in ordinal order. A batch may be empty (the segment was
    /// skipped); it still advances the cursor.
    pub fn submit(&mut self, ordinal: u32, batch: Vec<ProgressEventKind>) -> Vec<ProgressEventKind> {
        self.pending.insert(ordinal, batch);

        let mut ready = Vec::new();
        while let Some(batch) = self.pending.remove(&self.next) {
            ready.extend(batch);
            self.next += 1;
        }
        ready
    }

    /// Ordinals submitted but not yet flushed
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
