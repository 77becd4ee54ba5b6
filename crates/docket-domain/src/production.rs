//! Production: one tenant-scoped input artifact
//!
//! A production is immutable once created. Its lifecycle ends when all
//! derived segments are finalized or the run fails; the `RunState` of the
//! progress stream tracks that lifecycle, not the production itself.

use crate::ids::{CaseId, ProductionId};

/// Confidentiality designation attached by the producing party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confidentiality {
    /// No designation
    #[default]
    None,
    /// "Confidential" under the governing protective order
    Confidential,
    /// "Attorneys' Eyes Only"
    AttorneysEyesOnly,
}

impl Confidentiality {
    /// Stable string form for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidentiality::None => "none",
            Confidentiality::Confidential => "confidential",
            Confidentiality::AttorneysEyesOnly => "attorneys_eyes_only",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Confidentiality::None),
            "confidential" => Some(Confidentiality::Confidential),
            "attorneys_eyes_only" => Some(Confidentiality::AttorneysEyesOnly),
            _ => None,
        }
    }
}

/// A production: the single large input artifact containing multiple
/// logical documents. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    /// Unique identifier
    pub id: ProductionId,
    /// Owning case
    pub case_id: CaseId,
    /// Total number of pages (1-based page space is `[1, total_pages]`)
    pub total_pages: u32,
    /// Party that produced the documents
    pub producing_party: String,
    /// Producing party's batch identifier (e.g., volume label)
    pub batch_id: String,
    /// Confidentiality tag covering the whole production
    pub confidentiality: Confidentiality,
}

impl Production {
    /// Create a production with a fresh identifier
    pub fn new(
        case_id: CaseId,
        total_pages: u32,
        producing_party: impl Into<String>,
        batch_id: impl Into<String>,
        confidentiality: Confidentiality,
    ) -> Self {
        Self {
            id: ProductionId::new(),
            case_id,
            total_pages,
            producing_party: producing_party.into(),
            batch_id: batch_id.into(),
            confidentiality,
        }
    }
}
