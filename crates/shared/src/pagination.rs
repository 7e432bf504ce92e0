//! Offset pagination utilities.

use serde::Serialize;

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: i64 = 100;

/// A normalized page request.
///
/// Pages are 1-based; out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Rows to skip. Saturates for page numbers far past the last page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination info for list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };

        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageRequest::new(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_offset() {
        let page = PageRequest::new(Some(3), Some(25));
        assert_eq!(page.limit(), 25);
        assert_eq!(page.offset(), 50);
    }

    #[test]
    fn test_clamps_out_of_range_values() {
        let page = PageRequest::new(Some(0), Some(10_000));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);

        let page = PageRequest::new(Some(-4), Some(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let page = PageRequest::new(Some(i64::MAX), Some(20));
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.offset(), i64::MAX);

        let page = PageRequest::new(Some(i64::MAX / 10), Some(MAX_PER_PAGE));
        assert!(page.offset() > 0);
    }

    #[test]
    fn test_total_pages() {
        let request = PageRequest::new(Some(1), Some(20));
        assert_eq!(Pagination::new(request, 0).total_pages, 0);
        assert_eq!(Pagination::new(request, 20).total_pages, 1);
        assert_eq!(Pagination::new(request, 21).total_pages, 2);
    }
}
