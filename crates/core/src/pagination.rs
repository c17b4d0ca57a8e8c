//! Page arithmetic for listing operations.
//!
//! The core hands `(results, total)` to the caller; formatting the envelope
//! (next/prev links) is the API layer's job.

use serde::Serialize;

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Upper bound on a configured page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a configured page size to `[1, MAX_PAGE_SIZE]`.
pub fn clamp_page_size(size: i64) -> i64 {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// 1-based page number; anything below 1 becomes 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Offset/limit pair handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let limit = clamp_page_size(page_size);
        Self {
            offset: (page - 1).saturating_mul(limit),
            limit,
        }
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    /// Total number of pages (0 when there are no results).
    pub fn pages(&self) -> i64 {
        if self.total <= 0 {
            0
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_for_first_and_third_page() {
        assert_eq!(PageWindow::new(1, 5), PageWindow { offset: 0, limit: 5 });
        assert_eq!(PageWindow::new(3, 5), PageWindow { offset: 10, limit: 5 });
    }

    #[test]
    fn page_below_one_is_clamped() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(0)), 1);
        assert_eq!(clamp_page(Some(-4)), 1);
        assert_eq!(PageWindow::new(0, 5).offset, 0);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(clamp_page_size(0), 1);
        assert_eq!(clamp_page_size(1_000), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_counts() {
        let page = Page {
            results: vec![1, 2, 3, 4, 5],
            total: 11,
            page: 2,
            page_size: 5,
        };
        assert_eq!(page.pages(), 3);
        assert!(page.has_next());
        assert!(page.has_prev());

        let empty: Page<i32> = Page {
            results: vec![],
            total: 0,
            page: 1,
            page_size: 5,
        };
        assert_eq!(empty.pages(), 0);
        assert!(!empty.has_next());
        assert!(!empty.has_prev());
    }
}
