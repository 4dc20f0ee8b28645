//! The search driver.
//!
//! `SearchDriver` owns a [`SearchState`] and mutates it only through
//! handler functions, replacing the implicit state management a search-UI
//! framework would provide. Interactions compose: changing the search
//! term preserves facet selections (and resets paging), toggling a filter
//! preserves the term.

use cvsearch_core::Result;
use cvsearch_es::{FacetFilter, FilterValue, SearchBackend, SearchResults};

use crate::state::{PagingInfo, SearchState};

/// State container plus handlers, bound to a search backend.
pub struct SearchDriver {
    backend: Box<dyn SearchBackend>,
    state: SearchState,
}

impl SearchDriver {
    /// Create a driver over the given backend with the given page size.
    pub fn new(backend: Box<dyn SearchBackend>, page_size: usize) -> Self {
        Self {
            backend,
            state: SearchState::new(page_size),
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Paging summary for the current state.
    pub fn paging_info(&self) -> PagingInfo {
        self.state.paging_info()
    }

    /// Set a new search term.
    ///
    /// Resets to page 1; facet selections are preserved.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.term = term.into();
        self.state.page = 1;
    }

    /// Add a facet filter (no-op if the same selection is already active).
    ///
    /// Resets to page 1.
    pub fn add_filter(&mut self, filter: FacetFilter) {
        if !self.state.filters.contains(&filter) {
            self.state.filters.push(filter);
        }
        self.state.page = 1;
    }

    /// Remove a facet filter if present. Resets to page 1.
    pub fn remove_filter(&mut self, field: &str, value: &FilterValue) {
        self.state
            .filters
            .retain(|f| !(f.field == field && &f.value == value));
        self.state.page = 1;
    }

    /// Add the filter if absent, remove it if present. Resets to page 1.
    pub fn toggle_filter(&mut self, filter: FacetFilter) {
        if self.state.filters.contains(&filter) {
            self.remove_filter(&filter.field, &filter.value);
        } else {
            self.add_filter(filter);
        }
    }

    /// Drop every facet selection. Resets to page 1.
    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.state.page = 1;
    }

    /// Move to another page (1-based; 0 is clamped to 1).
    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.max(1);
    }

    /// Execute the current state through the backend and store the
    /// results.
    pub async fn run(&mut self) -> Result<&SearchResults> {
        let request = self.state.to_request();
        log::debug!(
            "Running search via '{}': term='{}', {} filter(s), page {}",
            self.backend.name(),
            request.term,
            request.filters.len(),
            request.page,
        );
        let results = self.backend.search(&request).await?;
        Ok(self.state.results.insert(results))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use cvsearch_es::{FacetBucket, FacetResult, SearchHit, SearchRequest, TranscriptionRecord};

    /// Backend returning a canned response and recording requests.
    struct StubBackend {
        requests: Mutex<Vec<SearchRequest>>,
        response: SearchResults,
    }

    impl StubBackend {
        fn new(response: SearchResults) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response,
            }
        }

        fn empty() -> Self {
            Self::new(SearchResults::empty())
        }

        fn last_request(&self) -> SearchRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for StubBackend {
        async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Shared handle so a test can inspect the stub after boxing it.
    struct SharedStub(Arc<StubBackend>);

    #[async_trait]
    impl SearchBackend for SharedStub {
        async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
            self.0.search(request).await
        }

        fn name(&self) -> &str {
            self.0.name()
        }
    }

    fn sample_results() -> SearchResults {
        SearchResults {
            hits: vec![SearchHit {
                id: Some("doc-1".to_string()),
                score: Some(1.5),
                record: TranscriptionRecord {
                    generated_text: "LEARN TO RECOGNIZE OMENS".to_string(),
                    duration: 4.62,
                    age: 28,
                    gender: "female".to_string(),
                    accent: "england".to_string(),
                },
            }],
            total: 41,
            facets: vec![FacetResult {
                field: "gender".to_string(),
                label: "Gender".to_string(),
                buckets: vec![FacetBucket {
                    value: "female".to_string(),
                    count: 41,
                }],
            }],
            took_ms: 3,
        }
    }

    #[tokio::test]
    async fn test_run_stores_results() {
        let mut driver = SearchDriver::new(Box::new(StubBackend::new(sample_results())), 20);
        driver.set_search_term("omens");
        let results = driver.run().await.unwrap();
        assert_eq!(results.total, 41);
        assert_eq!(driver.state().results.as_ref().unwrap().total, 41);
    }

    #[test]
    fn test_new_term_preserves_filters_and_resets_page() {
        // Facet selection followed by a new search term composes rather
        // than resetting.
        let mut driver = SearchDriver::new(Box::new(StubBackend::empty()), 20);

        driver.add_filter(FacetFilter::term("gender", "female"));
        driver.set_page(3);
        driver.set_search_term("experience");

        assert_eq!(
            driver.state().filters,
            vec![FacetFilter::term("gender", "female")]
        );
        assert_eq!(driver.state().page, 1);
        assert_eq!(driver.state().term, "experience");
    }

    #[test]
    fn test_toggle_filter() {
        let mut driver = SearchDriver::new(Box::new(StubBackend::empty()), 20);
        let filter = FacetFilter::bucket("age", "18-30");

        driver.toggle_filter(filter.clone());
        assert_eq!(driver.state().filters.len(), 1);

        driver.toggle_filter(filter);
        assert!(driver.state().filters.is_empty());
    }

    #[test]
    fn test_add_filter_deduplicates() {
        let mut driver = SearchDriver::new(Box::new(StubBackend::empty()), 20);
        driver.add_filter(FacetFilter::term("accent", "england"));
        driver.add_filter(FacetFilter::term("accent", "england"));
        assert_eq!(driver.state().filters.len(), 1);
    }

    #[test]
    fn test_remove_filter_only_matching() {
        let mut driver = SearchDriver::new(Box::new(StubBackend::empty()), 20);
        driver.add_filter(FacetFilter::term("gender", "female"));
        driver.add_filter(FacetFilter::bucket("age", "51+"));

        driver.remove_filter("gender", &FilterValue::Term("female".to_string()));
        assert_eq!(
            driver.state().filters,
            vec![FacetFilter::bucket("age", "51+")]
        );
    }

    #[test]
    fn test_set_page_clamps_zero() {
        let mut driver = SearchDriver::new(Box::new(StubBackend::empty()), 20);
        driver.set_page(0);
        assert_eq!(driver.state().page, 1);
    }

    #[tokio::test]
    async fn test_zero_results_paging_info() {
        let mut driver = SearchDriver::new(Box::new(StubBackend::empty()), 20);
        driver.set_search_term("xyzzy");
        driver.run().await.unwrap();

        let info = driver.paging_info();
        assert_eq!(info.start, 0);
        assert_eq!(info.end, 0);
        assert_eq!(info.total, 0);
    }

    #[tokio::test]
    async fn test_composed_state_reaches_backend() {
        let stub = Arc::new(StubBackend::empty());
        let mut driver = SearchDriver::new(Box::new(SharedStub(Arc::clone(&stub))), 20);

        driver.add_filter(FacetFilter::term("gender", "female"));
        driver.set_search_term("day");
        driver.run().await.unwrap();

        let request = stub.last_request();
        assert_eq!(request.term, "day");
        assert_eq!(request.filters, vec![FacetFilter::term("gender", "female")]);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 20);
    }
}
