//! Search state and paging arithmetic.
//!
//! `SearchState` is the explicit state container for the search page:
//! query string, selected facet filters, current page, and the last
//! fetched results. Nothing mutates it except the driver's handlers.

use serde::{Deserialize, Serialize};

use cvsearch_es::{FacetFilter, SearchRequest, SearchResults};

/// The whole mutable state of one search page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Current free-text search term.
    pub term: String,

    /// Selected facet filters.
    pub filters: Vec<FacetFilter>,

    /// Current page, 1-based.
    pub page: usize,

    /// Results per page.
    pub page_size: usize,

    /// Results of the most recent execution, if any.
    pub results: Option<SearchResults>,
}

impl SearchState {
    /// Create state with the given page size, on page 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            ..Default::default()
        }
    }

    /// The request corresponding to the current state.
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            term: self.term.clone(),
            filters: self.filters.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Paging summary for the current results (zero state when no
    /// execution has happened yet).
    pub fn paging_info(&self) -> PagingInfo {
        let total = self.results.as_ref().map(|r| r.total).unwrap_or(0);
        PagingInfo::compute(self.page, self.page_size, total)
    }
}

/// What the paging-info widget shows: `start` to `end` of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// 1-based ordinal of the first hit on this page (0 when empty).
    pub start: u64,
    /// 1-based ordinal of the last hit on this page (0 when empty).
    pub end: u64,
    /// Total matching documents.
    pub total: u64,
    /// Current page.
    pub page: usize,
    /// Total pages (0 when empty).
    pub total_pages: usize,
}

impl PagingInfo {
    /// Compute the summary for one page over `total` results.
    pub fn compute(page: usize, page_size: usize, total: u64) -> Self {
        let page_size_u64 = page_size.max(1) as u64;
        let total_pages = total.div_ceil(page_size_u64) as usize;

        if total == 0 {
            return Self {
                start: 0,
                end: 0,
                total: 0,
                page,
                total_pages: 0,
            };
        }

        let start = (page.saturating_sub(1) as u64) * page_size_u64 + 1;
        let end = (start + page_size_u64 - 1).min(total);
        if start > total {
            // Page beyond the end: an empty window past the last hit
            return Self {
                start: 0,
                end: 0,
                total,
                page,
                total_pages,
            };
        }

        Self {
            start,
            end,
            total,
            page,
            total_pages,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
