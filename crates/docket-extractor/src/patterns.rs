//! Deterministic entity matchers
//!
//! These run after the oracle, not instead of it: whatever the oracle
//! said, dates, amounts, citations, and Bates numbers present in a fact's
//! text are attached mechanically so they are never hallucinated or
//! missed.

use docket_domain::{EntityKind, ExtractedEntity};
use regex::Regex;
use std::sync::OnceLock;

fn date_regexes() -> &'static [Regex; 3] {
    static DATES: OnceLock<[Regex; 3]> = OnceLock::new();
    DATES.get_or_init(|| {
        [
            // March 3, 2019
            Regex::new(
                r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+\d{4}\b",
            )
            .expect("static pattern compiles"),
            // 2019-03-03
            Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("static pattern compiles"),
            // 3/3/2019
            Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").expect("static pattern compiles"),
        ]
    })
}

fn money_regex() -> &'static Regex {
    static MONEY: OnceLock<Regex> = OnceLock::new();
    MONEY.get_or_init(|| {
        Regex::new(r"\$\s?\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?(?:\s?(?:million|billion))?")
            .expect("static pattern compiles")
    })
}

fn citation_regex() -> &'static Regex {
    static CITATION: OnceLock<Regex> = OnceLock::new();
    CITATION.get_or_init(|| {
        // Reporter citations: 123 U.S. 456, 45 F.3d 1010, 12 F. Supp. 2d 99
        Regex::new(r"\b\d+\s+(?:U\.S\.|S\.\s?Ct\.|F\.(?:2d|3d)|F\.\s?Supp\.(?:\s?2d|\s?3d)?)\s+\d+\b")
            .expect("static pattern compiles")
    })
}

fn bates_regex() -> &'static Regex {
    static BATES: OnceLock<Regex> = OnceLock::new();
    BATES.get_or_init(|| Regex::new(r"\b[A-Z]{2,8}-\d{4,9}\b").expect("static pattern compiles"))
}

/// Find every entity in `text`, in match order per kind: dates, money,
/// citations, Bates numbers
pub fn extract_entities(text: &str) -> Vec<ExtractedEntity> {
    let mut entities = Vec::new();

    for regex in date_regexes() {
        for m in regex.find_iter(text) {
            push_unique(&mut entities, EntityKind::Date, m.as_str());
        }
    }
    for m in money_regex().find_iter(text) {
        push_unique(&mut entities, EntityKind::Money, m.as_str());
    }
    for m in citation_regex().find_iter(text) {
        push_unique(&mut entities, EntityKind::Citation, m.as_str());
    }
    for m in bates_regex().find_iter(text) {
        push_unique(&mut entities, EntityKind::BatesNumber, m.as_str());
    }

    entities
}

fn push_unique(entities: &mut Vec<ExtractedEntity>, kind: EntityKind, text: &str) {
    if !entities.iter().any(|e| e.kind == kind && e.text == text) {
        entities.push(ExtractedEntity {
            kind,
            text: text.to_string(),
        });
    }
}
