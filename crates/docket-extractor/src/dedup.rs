//! Two-stage fact deduplication
//!
//! Stage 1 (cheap, broad): embedding similarity against the case's
//! persisted facts pre-filters candidates. Stage 2 (precise): character
//! trigram Jaccard similarity confirms. A candidate is dropped only when
//! BOTH stages agree it duplicates an existing fact; near-paraphrases
//! that share vocabulary but state different things survive.

use crate::config::ExtractorConfig;
use docket_domain::traits::FactStore;
use docket_domain::{CaseId, FactId};
use std::collections::HashSet;

/// Outcome of a dedup check for one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum DedupDecision {
    /// No persisted fact duplicates the candidate
    New,
    /// The candidate duplicates a persisted fact
    Duplicate {
        /// The persisted fact it duplicates
        existing: FactId,
        /// Stage-1 embedding similarity
        vector_similarity: f32,
        /// Stage-2 trigram Jaccard similarity
        text_similarity: f64,
    },
}

/// Check one candidate against the case's persisted facts
pub fn evaluate<S: FactStore>(
    store: &S,
    authorized: CaseId,
    text: &str,
    embedding: &[f32],
    config: &ExtractorConfig,
) -> Result<DedupDecision, S::Error> {
    let neighbours = store.search_similar(
        authorized,
        embedding,
        config.vector_similarity_threshold,
        config.dedup_search_limit,
    )?;

    for (existing, vector_similarity) in neighbours {
        let text_similarity = trigram_jaccard(text, &existing.text);
        if text_similarity > config.text_similarity_threshold {
            return Ok(DedupDecision::Duplicate {
                existing: existing.id,
                vector_similarity,
                text_similarity,
            });
        }
    }
    Ok(DedupDecision::New)
}

/// Jaccard similarity of the two texts' lowercased character trigram
/// sets, in `[0, 1]`. Texts shorter than three characters compare as
/// whole strings.
pub fn trigram_jaccard(a: &str, b: &str) -> f64 {
    let set_a = trigrams(a);
    let set_b = trigrams(b);

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

fn trigrams(s: &str) -> HashSet<String> {
    let chars: Vec<char> = s.to_lowercase().chars().collect();
    if chars.is_empty() {
        return HashSet::new();
    }
    if chars.len() < 3 {
        let mut set = HashSet::new();
        set.insert(chars.iter().collect());
        return set;
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}
