//! Boundary candidates: page-level detection signals
//!
//! A candidate says "a new logical document appears to begin at this
//! page". Candidates are ephemeral input to the merger; only the merged
//! partition is ever persisted.

/// One candidate document boundary reported for an analysis window
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCandidate {
    /// Page at which a new document appears to begin (1-based)
    pub page: u32,
    /// Detection confidence in `[0, 1]`
    pub confidence: f64,
    /// Evidence strings supporting the boundary (letterhead, date line,
    /// signature block, ...)
    pub evidence: Vec<String>,
    /// Index of the window that produced this candidate
    pub source_window: usize,
}

impl BoundaryCandidate {
    /// Validate the candidate's fields
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 2 {
            // Page 1 is never itself a boundary; a document trivially
            // begins there.
            return Err(format!("page {} cannot be a boundary", self.page));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} out of range [0, 1]", self.confidence));
        }
        Ok(())
    }
}
