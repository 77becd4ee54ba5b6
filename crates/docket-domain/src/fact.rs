//! Facts: atomic extracted statements attributed to a segment

use crate::ids::{CaseId, FactId, SegmentId};

/// Category of an extracted fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactCategory {
    /// A factual assertion about events or parties
    #[default]
    Assertion,
    /// A date or deadline
    Date,
    /// A monetary amount or financial term
    Financial,
    /// An obligation or commitment
    Obligation,
    /// An admission against interest
    Admission,
}

impl FactCategory {
    /// Stable string form for storage and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            FactCategory::Assertion => "assertion",
            FactCategory::Date => "date",
            FactCategory::Financial => "financial",
            FactCategory::Obligation => "obligation",
            FactCategory::Admission => "admission",
        }
    }

    /// Parse the stable string form; unknown strings default to `Assertion`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" | "deadline" => FactCategory::Date,
            "financial" | "monetary" => FactCategory::Financial,
            "obligation" | "commitment" => FactCategory::Obligation,
            "admission" => FactCategory::Admission,
            _ => FactCategory::Assertion,
        }
    }
}

/// Kind of entity found by the deterministic pattern matchers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A calendar date
    Date,
    /// A monetary amount
    Money,
    /// A legal citation
    Citation,
    /// A Bates-stamped document identifier
    BatesNumber,
}

impl EntityKind {
    /// Stable string form for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Date => "date",
            EntityKind::Money => "money",
            EntityKind::Citation => "citation",
            EntityKind::BatesNumber => "bates_number",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date" => Some(EntityKind::Date),
            "money" => Some(EntityKind::Money),
            "citation" => Some(EntityKind::Citation),
            "bates_number" => Some(EntityKind::BatesNumber),
            _ => None,
        }
    }
}

/// An entity found inside a fact's text by a deterministic matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntity {
    /// What kind of entity this is
    pub kind: EntityKind,
    /// The matched text, verbatim
    pub text: String,
}

/// An atomic extracted statement attributed to a segment.
///
/// A fact may be rejected as a duplicate before persistence; once
/// persisted it is owned by the case's fact store.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    /// Unique identifier
    pub id: FactId,
    /// Owning case
    pub case_id: CaseId,
    /// Segment the fact was extracted from
    pub segment_id: SegmentId,
    /// The statement itself
    pub text: String,
    /// Category of the statement
    pub category: FactCategory,
    /// Extraction confidence in `[0, 1]`
    pub confidence: f64,
    /// Character span within the segment text the fact was taken from
    pub source_span: (usize, usize),
    /// Entities found by the deterministic matchers
    pub entities: Vec<ExtractedEntity>,
    /// Embedding vector used for similarity search
    pub embedding: Vec<f32>,
}

impl Fact {
    /// Validate field ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("fact text is empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} out of range [0, 1]", self.confidence));
        }
        if self.source_span.0 > self.source_span.1 {
            return Err(format!(
                "source span {}..{} is inverted",
                self.source_span.0, self.source_span.1
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(text: &str, confidence: f64) -> Fact {
        Fact {
            id: FactId::new(),
            case_id: CaseId::new(),
            segment_id: SegmentId::new(),
            text: text.to_string(),
            category: FactCategory::Assertion,
            confidence,
            source_span: (0, text.len()),
            entities: Vec::new(),
            embedding: Vec::new(),
        }
    }

    #[test]
    fn test_valid_fact() {
        assert!(fact("The contract was signed on March 3, 2019.", 0.9)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(fact("   ", 0.9).validate().is_err());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        assert!(fact("something", 1.5).validate().is_err());
    }

    #[test]
    fn test_inverted_span_rejected() {
        let mut f = fact("something", 0.5);
        f.source_span = (10, 2);
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_category_round_trip() {
        for cat in [
            FactCategory::Assertion,
            FactCategory::Date,
            FactCategory::Financial,
            FactCategory::Obligation,
            FactCategory::Admission,
        ] {
            assert_eq!(FactCategory::parse(cat.as_str()), cat);
        }
        assert_eq!(FactCategory::parse("weather"), FactCategory::Assertion);
    }
}
