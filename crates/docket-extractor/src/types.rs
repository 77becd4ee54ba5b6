//! Intermediate types for the extraction pipeline

use docket_domain::FactCategory;

/// A candidate fact mined from one chunk, before enrichment and dedup
#[derive(Debug, Clone, PartialEq)]
pub struct FactCandidate {
    /// The statement text
    pub text: String,
    /// Category reported by the oracle
    pub category: FactCategory,
    /// Mining confidence in `[0, 1]`
    pub confidence: f64,
}

impl FactCandidate {
    /// Validate the candidate's fields
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("candidate text is empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} out of range [0, 1]", self.confidence));
        }
        Ok(())
    }
}
