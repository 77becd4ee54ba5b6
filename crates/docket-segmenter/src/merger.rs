//! Merge window-level boundary candidates into a verified partition
//!
//! Overlapping windows report the same physical boundary at slightly
//! different pages; coalescing treats candidates within the tolerance as
//! one boundary, keeping the strongest confidence and the union of
//! evidence. Surviving boundaries become cut points and the cut points
//! become the production's partition, which is verified before anything
//! downstream may use it.

use crate::error::SegmenterError;
use docket_domain::{verify_partition, BoundaryCandidate, PageRange};
use tracing::debug;

/// A boundary agreed on across windows
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBoundary {
    /// Page at which the new document begins
    pub page: u32,
    /// Strongest confidence among the coalesced candidates
    pub confidence: f64,
    /// Union of the coalesced candidates' evidence
    pub evidence: Vec<String>,
}

/// Coalesce candidates whose pages differ by at most `tolerance`.
///
/// The representative page is the highest-confidence member's page;
/// evidence is the deduplicated union. Deterministic for a given
/// candidate multiset.
pub fn coalesce(mut candidates: Vec<BoundaryCandidate>, tolerance: u32) -> Vec<MergedBoundary> {
    if candidates.is_empty() {
        return Vec::new();
    }
    candidates.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(b.confidence.total_cmp(&a.confidence))
    });

    let mut merged: Vec<MergedBoundary> = Vec::new();
    let mut group: Vec<BoundaryCandidate> = vec![candidates[0].clone()];

    for candidate in candidates.into_iter().skip(1) {
        let last_page = group[group.len() - 1].page;
        if candidate.page - last_page <= tolerance {
            group.push(candidate);
        } else {
            merged.push(collapse_group(std::mem::take(&mut group)));
            group.push(candidate);
        }
    }
    merged.push(collapse_group(group));
    merged
}

fn collapse_group(group: Vec<BoundaryCandidate>) -> MergedBoundary {
    // Sort order guarantees the first max-confidence member wins ties by
    // lower page
    let best = group
        .iter()
        .enumerate()
        .max_by(|(ai, a), (bi, b)| {
            a.confidence
                .total_cmp(&b.confidence)
                .then(bi.cmp(ai))
        })
        .map(|(_, c)| c.clone())
        .unwrap_or_else(|| group[0].clone());

    let mut evidence = Vec::new();
    for candidate in &group {
        for item in &candidate.evidence {
            if !evidence.contains(item) {
                evidence.push(item.clone());
            }
        }
    }

    MergedBoundary {
        page: best.page,
        confidence: best.confidence,
        evidence,
    }
}

/// Full merge: coalesce, threshold, cut, verify.
///
/// Returns the production's partition of `[1, total_pages]`. With zero
/// surviving boundaries the whole production is one segment.
pub fn merge(
    candidates: Vec<BoundaryCandidate>,
    total_pages: u32,
    confidence_threshold: f64,
    coalesce_tolerance: u32,
) -> Result<Vec<PageRange>, SegmenterError> {
    let merged = coalesce(candidates, coalesce_tolerance);
    let surviving: Vec<u32> = merged
        .iter()
        .filter(|b| b.confidence >= confidence_threshold)
        .map(|b| b.page)
        .collect();

    debug!(
        merged = merged.len(),
        surviving = surviving.len(),
        "boundary merge complete"
    );
    build_partition(&surviving, total_pages)
}

/// Build the partition from sorted, in-range cut points
pub fn build_partition(
    boundary_pages: &[u32],
    total_pages: u32,
) -> Result<Vec<PageRange>, SegmenterError> {
    if total_pages == 0 {
        return Err(SegmenterError::InvariantViolation(
            "production has zero pages".to_string(),
        ));
    }

    let mut cuts: Vec<u32> = boundary_pages
        .iter()
        .copied()
        .filter(|&p| p >= 2 && p <= total_pages)
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut ranges = Vec::with_capacity(cuts.len() + 1);
    let mut start = 1u32;
    for cut in cuts {
        ranges.push(
            PageRange::new(start, cut - 1).map_err(SegmenterError::InvariantViolation)?,
        );
        start = cut;
    }
    ranges.push(PageRange::new(start, total_pages).map_err(SegmenterError::InvariantViolation)?);

    verify_partition(&ranges, total_pages).map_err(SegmenterError::InvariantViolation)?;
    Ok(ranges)
}

/// Whether the one-shot adaptive fallback should re-run detection with a
/// smaller window
pub fn needs_fallback(segment_count: usize, total_pages: u32, fallback_min_pages: u32) -> bool {
    segment_count <= 1 && total_pages > fallback_min_pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(page: u32, confidence: f64, window: usize) -> BoundaryCandidate {
        BoundaryCandidate {
            page,
            confidence,
            evidence: vec![format!("evidence-p{}-w{}", page, window)],
            source_window: window,
        }
    }

    #[test]
    fn test_coalesce_adjacent_pages() {
        // Two windows saw the same boundary at 9 and 10
        let merged = coalesce(vec![candidate(9, 0.7, 0), candidate(10, 0.9, 1)], 1);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].page, 10);
        assert_eq!(merged[0].confidence, 0.9);
        assert_eq!(merged[0].evidence.len(), 2);
    }

    #[test]
    fn test_coalesce_keeps_distant_boundaries_apart() {
        let merged = coalesce(vec![candidate(9, 0.8, 0), candidate(21, 0.8, 1)], 1);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].page, 9);
        assert_eq!(merged[1].page, 21);
    }

    #[test]
    fn test_coalesce_dedupes_evidence() {
        let mut a = candidate(9, 0.7, 0);
        let mut b = candidate(9, 0.8, 1);
        a.evidence = vec!["letterhead".to_string()];
        b.evidence = vec!["letterhead".to_string(), "date line".to_string()];

        let merged = coalesce(vec![a, b], 1);
        assert_eq!(merged[0].evidence, vec!["letterhead", "date line"]);
    }

    #[test]
    fn test_coalesce_is_deterministic_under_input_order() {
        let forward = vec![candidate(9, 0.7, 0), candidate(10, 0.9, 1), candidate(21, 0.8, 2)];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = coalesce(forward, 1);
        let b = coalesce(reversed, 1);
        let pages_a: Vec<u32> = a.iter().map(|m| m.page).collect();
        let pages_b: Vec<u32> = b.iter().map(|m| m.page).collect();
        assert_eq!(pages_a, pages_b);
    }

    #[test]
    fn test_merge_spec_scenario_forty_pages() {
        // Boundaries at 9, 21, 31; the one at 21 is seen by two windows
        let candidates = vec![
            candidate(9, 0.85, 0),
            candidate(21, 0.8, 1),
            candidate(21, 0.75, 2),
            candidate(31, 0.9, 3),
            candidate(15, 0.4, 1), // below threshold, dropped
        ];

        let partition = merge(candidates, 40, 0.7, 1).unwrap();
        let ranges: Vec<(u32, u32)> = partition.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(ranges, vec![(1, 8), (9, 20), (21, 30), (31, 40)]);
    }

    #[test]
    fn test_merge_no_boundaries_yields_single_segment() {
        let partition = merge(Vec::new(), 38, 0.7, 1).unwrap();
        assert_eq!(partition.len(), 1);
        assert_eq!((partition[0].start, partition[0].end), (1, 38));
    }

    #[test]
    fn test_merge_all_below_threshold() {
        let candidates = vec![candidate(10, 0.3, 0), candidate(20, 0.5, 1)];
        let partition = merge(candidates, 40, 0.7, 1).unwrap();
        assert_eq!(partition.len(), 1);
    }

    #[test]
    fn test_build_partition_rejects_zero_pages() {
        assert!(matches!(
            build_partition(&[], 0),
            Err(SegmenterError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_build_partition_ignores_out_of_range_pages() {
        let partition = build_partition(&[1, 50, 9], 40).unwrap();
        let ranges: Vec<(u32, u32)> = partition.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(ranges, vec![(1, 8), (9, 40)]);
    }

    #[test]
    fn test_needs_fallback() {
        assert!(needs_fallback(1, 40, 10));
        assert!(needs_fallback(0, 40, 10));
        assert!(!needs_fallback(2, 40, 10));
        assert!(!needs_fallback(1, 10, 10));
        assert!(!needs_fallback(1, 8, 10));
    }

    proptest! {
        /// Property: merge output always partitions the page run, for any
        /// candidate multiset
        #[test]
        fn prop_merge_always_partitions(
            total in 1u32..300,
            pages in proptest::collection::vec(2u32..300, 0..12),
            confidences in proptest::collection::vec(0.0f64..=1.0, 12),
        ) {
            let candidates: Vec<BoundaryCandidate> = pages
                .iter()
                .zip(confidences.iter())
                .enumerate()
                .map(|(i, (&page, &confidence))| BoundaryCandidate {
                    page,
                    confidence,
                    evidence: Vec::new(),
                    source_window: i,
                })
                .collect();

            let partition = merge(candidates, total, 0.7, 1).unwrap();
            prop_assert!(verify_partition(&partition, total).is_ok());
        }
    }
}
