//! Page ranges and the partition invariant
//!
//! Pages are 1-based and ranges are inclusive on both ends. The ordered
//! segments of a production must partition `[1, total_pages]` exactly:
//! no gaps, no overlaps. That invariant is what makes boundary detection
//! safe to act on, so it is checked explicitly rather than assumed.

use std::fmt;

/// An inclusive 1-based page range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    /// First page (1-based, inclusive)
    pub start: u32,
    /// Last page (inclusive)
    pub end: u32,
}

impl PageRange {
    /// Create a range, validating `1 <= start <= end`
    pub fn new(start: u32, end: u32) -> Result<Self, String> {
        if start == 0 {
            return Err("pages are 1-based; start must be >= 1".to_string());
        }
        if start > end {
            return Err(format!("start {} is after end {}", start, end));
        }
        Ok(Self { start, end })
    }

    /// Number of pages covered
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// True only for the degenerate zero-width case, which `new` forbids
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Whether `page` falls inside this range
    pub fn contains(&self, page: u32) -> bool {
        page >= self.start && page <= self.end
    }

    /// Whether two ranges share any page
    pub fn overlaps(&self, other: &PageRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Verify that `ranges`, taken in order, partition `[1, total_pages]`
/// exactly: contiguous, non-overlapping, first page 1, last page
/// `total_pages`.
///
/// Returns a description of the first violation found, or `Ok(())`.
pub fn verify_partition(ranges: &[PageRange], total_pages: u32) -> Result<(), String> {
    if total_pages == 0 {
        return Err("production has zero pages".to_string());
    }
    if ranges.is_empty() {
        return Err("no ranges cover the production".to_string());
    }
    if ranges[0].start != 1 {
        return Err(format!("first range {} does not start at page 1", ranges[0]));
    }
    for pair in ranges.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start != prev.end + 1 {
            return Err(format!(
                "range {} does not follow {} contiguously",
                next, prev
            ));
        }
    }
    let last = ranges[ranges.len() - 1];
    if last.end != total_pages {
        return Err(format!(
            "last range {} does not end at page {}",
            last, total_pages
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: u32, end: u32) -> PageRange {
        PageRange::new(start, end).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_page() {
        assert!(PageRange::new(0, 5).is_err());
    }

    #[test]
    fn test_new_rejects_inverted() {
        assert!(PageRange::new(5, 4).is_err());
    }

    #[test]
    fn test_len_and_contains() {
        let range = r(3, 7);
        assert_eq!(range.len(), 5);
        assert!(range.contains(3));
        assert!(range.contains(7));
        assert!(!range.contains(2));
        assert!(!range.contains(8));
    }

    #[test]
    fn test_single_page_range() {
        let range = r(4, 4);
        assert_eq!(range.len(), 1);
        assert!(range.contains(4));
    }

    #[test]
    fn test_overlaps() {
        assert!(r(1, 5).overlaps(&r(5, 9)));
        assert!(!r(1, 5).overlaps(&r(6, 9)));
        assert!(r(3, 4).overlaps(&r(1, 10)));
    }

    #[test]
    fn test_valid_partition() {
        let ranges = vec![r(1, 8), r(9, 20), r(21, 30), r(31, 40)];
        assert!(verify_partition(&ranges, 40).is_ok());
    }

    #[test]
    fn test_single_range_partition() {
        assert!(verify_partition(&[r(1, 38)], 38).is_ok());
    }

    #[test]
    fn test_partition_with_gap_rejected() {
        let ranges = vec![r(1, 8), r(10, 40)];
        let err = verify_partition(&ranges, 40).unwrap_err();
        assert!(err.contains("contiguously"));
    }

    #[test]
    fn test_partition_with_overlap_rejected() {
        let ranges = vec![r(1, 10), r(10, 40)];
        assert!(verify_partition(&ranges, 40).is_err());
    }

    #[test]
    fn test_partition_wrong_start_rejected() {
        assert!(verify_partition(&[r(2, 40)], 40).is_err());
    }

    #[test]
    fn test_partition_wrong_end_rejected() {
        assert!(verify_partition(&[r(1, 39)], 40).is_err());
    }

    #[test]
    fn test_empty_partition_rejected() {
        assert!(verify_partition(&[], 40).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: ranges built from sorted cut points always partition
        /// the page space
        #[test]
        fn test_cut_points_always_partition(
            total in 1u32..500,
            cuts in proptest::collection::btree_set(2u32..500, 0..8)
        ) {
            let cuts: Vec<u32> = cuts.into_iter().filter(|&c| c <= total).collect();
            let mut ranges = Vec::new();
            let mut start = 1u32;
            for &cut in &cuts {
                ranges.push(PageRange::new(start, cut - 1).unwrap());
                start = cut;
            }
            ranges.push(PageRange::new(start, total).unwrap());
            prop_assert!(verify_partition(&ranges, total).is_ok());
        }

        /// Property: a partition covers every page exactly once
        #[test]
        fn test_partition_covers_each_page_once(
            total in 1u32..200,
            cuts in proptest::collection::btree_set(2u32..200, 0..6)
        ) {
            let cuts: Vec<u32> = cuts.into_iter().filter(|&c| c <= total).collect();
            let mut ranges = Vec::new();
            let mut start = 1u32;
            for &cut in &cuts {
                ranges.push(PageRange::new(start, cut - 1).unwrap());
                start = cut;
            }
            ranges.push(PageRange::new(start, total).unwrap());

            for page in 1..=total {
                let covering = ranges.iter().filter(|r| r.contains(page)).count();
                prop_assert_eq!(covering, 1, "page {} covered {} times", page, covering);
            }
        }
    }
}
