//! Segment classification with graceful degradation
//!
//! Classification never fails a run: an oracle error, timeout, or
//! unparseable response yields `DocumentType::Unclassified` and the
//! segment proceeds through extraction regardless.

use crate::parser;
use crate::prompt;
use docket_domain::{DocumentType, IdRange, PageRange};
use docket_oracle::LlmClient;
use regex::Regex;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

/// Classification result for one finalized segment
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Assigned document type
    pub document_type: DocumentType,
    /// Short human-readable title; empty when classification degraded
    pub title: String,
    /// Stamped identifier range
    pub id_range: IdRange,
    /// Classification confidence in `[0, 1]`
    pub confidence: f64,
}

impl Classification {
    /// The degraded result: unclassified, untitled, zero confidence
    pub fn unclassified() -> Self {
        Self {
            document_type: DocumentType::Unclassified,
            title: String::new(),
            id_range: IdRange::empty(),
            confidence: 0.0,
        }
    }
}

/// Classifies finalized segments via the oracle capability
pub struct SegmentClassifier {
    client: Arc<dyn LlmClient>,
    call_timeout: Duration,
}

impl SegmentClassifier {
    /// Create a classifier over `client` with a per-call timeout
    pub fn new(client: Arc<dyn LlmClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }

    /// Classify one segment from its page range and text. Infallible by
    /// contract: every failure path degrades to `unclassified`. When the
    /// oracle omits the stamped identifier range, the deterministic
    /// matcher fills it from the page text.
    pub async fn classify(&self, pages: PageRange, text: &str) -> Classification {
        let prompt = prompt::classification_prompt(pages, text);

        let response =
            match tokio::time::timeout(self.call_timeout, self.client.generate(&prompt)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(%pages, "classification call failed: {}", e);
                    return self.degraded(text);
                }
                Err(_) => {
                    warn!(%pages, "classification timed out");
                    return self.degraded(text);
                }
            };

        let mut classification = match parser::parse_classification_response(&response) {
            Ok(classification) => classification,
            Err(e) => {
                warn!(%pages, "unparseable classification: {}", e);
                return self.degraded(text);
            }
        };

        if classification.id_range.is_empty() {
            if let Some(id_range) = derive_id_range(text) {
                classification.id_range = id_range;
            }
        }
        classification
    }

    fn degraded(&self, text: &str) -> Classification {
        let mut classification = Classification::unclassified();
        if let Some(id_range) = derive_id_range(text) {
            classification.id_range = id_range;
        }
        classification
    }
}

fn bates_regex() -> &'static Regex {
    static BATES: OnceLock<Regex> = OnceLock::new();
    BATES.get_or_init(|| {
        Regex::new(r"\b[A-Z]{2,8}-\d{4,9}\b").expect("static pattern compiles")
    })
}

/// Derive the stamped identifier range from Bates-style patterns in the
/// segment text, in page order
pub fn derive_id_range(text: &str) -> Option<IdRange> {
    let mut matches = bates_regex().find_iter(text).map(|m| m.as_str());
    let first = matches.next()?.to_string();
    let last = matches.last().map(str::to_string).unwrap_or_else(|| first.clone());
    Some(IdRange { first, last })
}
