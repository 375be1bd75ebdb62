//! Pagination utilities for song listing
//!
//! Listing is unpaginated unless the caller supplies `limit`.

/// A LIMIT/OFFSET window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Rows to skip
    pub offset: i64,
    /// Maximum rows to return (always >= 1)
    pub limit: i64,
}

/// Calculate the page window for a 1-indexed `page` and a page size `limit`
///
/// Returns `None` when no `limit` was requested, meaning "return every match".
/// `page` defaults to 1 and is clamped to at least 1; `limit` is clamped to at
/// least 1 (callers reject non-positive limits before getting here).
///
/// # Examples
/// ```
/// use muslib_api::pagination::{calculate_window, PageWindow};
///
/// assert_eq!(calculate_window(Some(3), Some(10)), Some(PageWindow { offset: 20, limit: 10 }));
/// assert_eq!(calculate_window(Some(3), None), None);
/// ```
pub fn calculate_window(page: Option<i64>, limit: Option<i64>) -> Option<PageWindow> {
    let limit = limit?.max(1);
    let page = page.unwrap_or(1).max(1);

    Some(PageWindow {
        offset: (page - 1).saturating_mul(limit),
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_limit_means_no_window() {
        assert_eq!(calculate_window(None, None), None);
        assert_eq!(calculate_window(Some(4), None), None);
    }

    #[test]
    fn test_first_page_by_default() {
        let w = calculate_window(None, Some(10)).unwrap();
        assert_eq!(w.offset, 0);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn test_later_page() {
        let w = calculate_window(Some(2), Some(25)).unwrap();
        assert_eq!(w.offset, 25);
        assert_eq!(w.limit, 25);
    }

    #[test]
    fn test_page_out_of_bounds_low() {
        let w = calculate_window(Some(0), Some(10)).unwrap();
        assert_eq!(w.offset, 0);

        let w = calculate_window(Some(-5), Some(10)).unwrap();
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let w = calculate_window(Some(i64::MAX), Some(100)).unwrap();
        assert_eq!(w.offset, i64::MAX);
    }
}
