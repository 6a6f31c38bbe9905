//! Pagination for list queries
//!
//! Pages are 1-indexed. Requested pages outside `[1, total_pages]` are
//! clamped, and page size is clamped to `[1, MAX_LIMIT]`.

use serde::Serialize;

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a caller may request
pub const MAX_LIMIT: i64 = 100;

/// Requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_LIMIT)
    }
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed, clamped)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
    pub limit: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// ```
/// use owa_common::db::pagination::calculate_pagination;
/// use owa_common::db::PageRequest;
///
/// // 25 results at 10 per page = 3 pages
/// let p = calculate_pagination(25, PageRequest::new(2, 10));
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
///
/// // Out-of-bounds page gets clamped
/// let p = calculate_pagination(25, PageRequest::new(99, 10));
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 20);
/// ```
pub fn calculate_pagination(total_results: i64, request: PageRequest) -> Pagination {
    let limit = request.limit.clamp(1, MAX_LIMIT);
    let total_pages = (total_results + limit - 1) / limit;
    let page = request.page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * limit;

    Pagination {
        page,
        total_pages,
        offset,
        limit,
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: pagination.total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_first_page() {
        let p = calculate_pagination(15, PageRequest::new(1, 10));
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_out_of_bounds_low() {
        let p = calculate_pagination(15, PageRequest::new(0, 10));
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, PageRequest::default());
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_limit_clamped() {
        assert_eq!(PageRequest::new(1, 0).limit, 1);
        assert_eq!(PageRequest::new(1, 5000).limit, MAX_LIMIT);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(20, PageRequest::new(2, 10));
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 10);
    }
}
