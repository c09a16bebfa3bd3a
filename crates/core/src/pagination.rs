//! Page/offset arithmetic for list endpoints.

use serde::{Deserialize, Serialize};

use crate::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

/// Query parameters as supplied by the client (`?page=&page_size=`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<PageQuery> for Pagination {
    /// Out-of-range values fall back to the defaults rather than erroring.
    fn from(query: PageQuery) -> Self {
        let page = query.page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = query
            .page_size
            .filter(|s| (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(s))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }
}

impl Pagination {
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> usize {
        self.page_size
    }
}

/// A page of results with the total across all pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Pagination metadata returned alongside list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<usize>,
}

impl PageMeta {
    pub fn new(pagination: Pagination, total_items: usize) -> Self {
        let total_pages = total_items.div_ceil(pagination.page_size).max(1);
        let has_next = pagination.page < total_pages;
        let has_previous = pagination.page > 1;

        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next,
            has_previous,
            next_page: has_next.then_some(pagination.page + 1),
            previous_page: has_previous.then_some(pagination.page - 1),
        }
    }
}
