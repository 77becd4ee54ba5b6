//! Segments: finalized logical documents within a production

use crate::ids::{CaseId, ProductionId, SegmentId};
use crate::pages::PageRange;
use std::fmt;

/// Document type assigned by classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentType {
    /// Classification failed or was below confidence; never fails the run
    #[default]
    Unclassified,
    /// Correspondence (letters, memos)
    Correspondence,
    /// Email message or thread
    Email,
    /// Contract or agreement
    Contract,
    /// Invoice, statement, or other financial record
    FinancialRecord,
    /// Court filing or pleading
    Pleading,
    /// Meeting minutes or notes
    Minutes,
    /// Technical report or study
    Report,
    /// Anything recognized but outside the above
    Other,
}

impl DocumentType {
    /// Stable string form for storage and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Unclassified => "unclassified",
            DocumentType::Correspondence => "correspondence",
            DocumentType::Email => "email",
            DocumentType::Contract => "contract",
            DocumentType::FinancialRecord => "financial_record",
            DocumentType::Pleading => "pleading",
            DocumentType::Minutes => "minutes",
            DocumentType::Report => "report",
            DocumentType::Other => "other",
        }
    }

    /// Parse the stable string form; unknown strings map to `Unclassified`
    /// rather than failing, per the classifier contract.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "correspondence" | "letter" | "memo" => DocumentType::Correspondence,
            "email" => DocumentType::Email,
            "contract" | "agreement" => DocumentType::Contract,
            "financial_record" | "invoice" | "statement" => DocumentType::FinancialRecord,
            "pleading" | "filing" => DocumentType::Pleading,
            "minutes" | "notes" => DocumentType::Minutes,
            "report" | "study" => DocumentType::Report,
            "other" => DocumentType::Other,
            _ => DocumentType::Unclassified,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier range stamped on the segment's pages (e.g., a Bates range
/// such as `ACME-000123` through `ACME-000130`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdRange {
    /// First stamped identifier
    pub first: String,
    /// Last stamped identifier
    pub last: String,
}

impl IdRange {
    /// An empty range, used when no identifiers were found
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any identifiers were found
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.last.is_empty()
    }
}

/// One finalized logical document within a production.
///
/// Immutable once created. For a given production the ordered segments
/// partition `[1, total_pages]` exactly; constructing a set of segments
/// that violates that invariant is a fatal pipeline error, enforced
/// before anything is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Unique identifier
    pub id: SegmentId,
    /// Owning case
    pub case_id: CaseId,
    /// Production this segment was carved from
    pub production_id: ProductionId,
    /// Position within the production (0-based, strictly increasing)
    pub ordinal: u32,
    /// Inclusive page range
    pub pages: PageRange,
    /// Classified document type
    pub document_type: DocumentType,
    /// Short human-readable title
    pub title: String,
    /// Stamped identifier range (e.g., Bates numbers)
    pub id_range: IdRange,
    /// Confidence of the boundary/classification that produced this segment
    pub confidence: f64,
}
