//! Sliding-window cover of a production's page run

use docket_domain::PageRange;

/// One analysis window over a production's pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// 0-based window index, increasing with page position
    pub index: usize,
    /// Inclusive page range covered by this window
    pub pages: PageRange,
}

/// Produce the ordered window cover of `[1, total_pages]`.
///
/// Consecutive windows share exactly `overlap` pages; the last window is
/// clipped to the final page, never padded. Requires `overlap <
/// window_size` (enforced by config validation). Deterministic; an empty
/// production yields no windows.
pub fn windows(total_pages: u32, window_size: u32, overlap: u32) -> Vec<PageWindow> {
    if total_pages == 0 || window_size == 0 || overlap >= window_size {
        return Vec::new();
    }

    let step = window_size - overlap;
    let mut result = Vec::new();
    let mut start = 1u32;

    loop {
        let end = (start + window_size - 1).min(total_pages);
        // start <= end <= total_pages holds for every iteration
        let pages = match PageRange::new(start, end) {
            Ok(pages) => pages,
            Err(_) => break,
        };
        result.push(PageWindow {
            index: result.len(),
            pages,
        });

        if end == total_pages {
            break;
        }
        start += step;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_forty_pages_default_windows() {
        let windows = windows(40, 10, 2);
        let ranges: Vec<(u32, u32)> = windows.iter().map(|w| (w.pages.start, w.pages.end)).collect();
        assert_eq!(
            ranges,
            vec![(1, 10), (9, 18), (17, 26), (25, 34), (33, 40)]
        );
        assert_eq!(windows.last().unwrap().index, 4);
    }

    #[test]
    fn test_last_window_clipped_not_padded() {
        let windows = windows(38, 10, 2);
        let last = windows.last().unwrap();
        assert_eq!((last.pages.start, last.pages.end), (33, 38));
        assert_eq!(last.pages.len(), 6);
    }

    #[test]
    fn test_single_window_when_production_fits() {
        let windows = windows(7, 10, 2);
        assert_eq!(windows.len(), 1);
        assert_eq!((windows[0].pages.start, windows[0].pages.end), (1, 7));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_sliver() {
        // 18 = 10 + step(8): second window ends exactly at 18
        let windows = windows(18, 10, 2);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1].pages.end, 18);
    }

    #[test]
    fn test_zero_overlap() {
        let windows = windows(20, 5, 0);
        let ranges: Vec<(u32, u32)> = windows.iter().map(|w| (w.pages.start, w.pages.end)).collect();
        assert_eq!(ranges, vec![(1, 5), (6, 10), (11, 15), (16, 20)]);
    }

    #[test]
    fn test_empty_production() {
        assert!(windows(0, 10, 2).is_empty());
    }

    #[test]
    fn test_degenerate_parameters() {
        assert!(windows(10, 0, 0).is_empty());
        assert!(windows(10, 5, 5).is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_page_is_covered(
            total in 1u32..500,
            window in 2u32..40,
            overlap in 0u32..39,
        ) {
            prop_assume!(overlap < window);
            let ws = windows(total, window, overlap);

            prop_assert!(!ws.is_empty());
            prop_assert_eq!(ws[0].pages.start, 1);
            prop_assert_eq!(ws.last().unwrap().pages.end, total);
            for page in 1..=total {
                prop_assert!(ws.iter().any(|w| w.pages.contains(page)));
            }
        }

        #[test]
        fn prop_consecutive_windows_share_exact_overlap(
            total in 1u32..500,
            window in 2u32..40,
            overlap in 0u32..39,
        ) {
            prop_assume!(overlap < window);
            let ws = windows(total, window, overlap);

            for pair in ws.windows(2) {
                let shared = if pair[1].pages.start > pair[0].pages.end {
                    0
                } else {
                    pair[0].pages.end - pair[1].pages.start + 1
                };
                prop_assert_eq!(shared, overlap);
                prop_assert_eq!(pair[1].index, pair[0].index + 1);
            }
        }
    }
}
