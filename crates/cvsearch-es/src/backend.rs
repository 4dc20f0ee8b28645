//! Search backend trait and request/result types.
//!
//! `SearchRequest` captures the whole mutable search state (term, selected
//! filters, page); `SearchResults` is what a backend hands back: hits,
//! total count, and per-bucket facet counts. The `SearchBackend` trait is
//! the seam between the state driver and the Elasticsearch connector, and
//! lets driver tests substitute a canned backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cvsearch_core::Result;

use crate::document::TranscriptionRecord;

/// A selected filter value within one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    /// Exact value selection on a value facet (e.g. `gender = "female"`).
    Term(String),
    /// Bucket selection on a range facet, by display label (e.g. `18-30`).
    Bucket(String),
}

impl FilterValue {
    /// The display form of the selection.
    pub fn as_str(&self) -> &str {
        match self {
            FilterValue::Term(value) => value,
            FilterValue::Bucket(label) => label,
        }
    }
}

/// One selected facet filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFilter {
    /// Facet field name.
    pub field: String,
    /// Selected value or bucket.
    pub value: FilterValue,
}

impl FacetFilter {
    /// Select an exact value on a value facet.
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: FilterValue::Term(value.into()),
        }
    }

    /// Select a range bucket by label.
    pub fn bucket(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: FilterValue::Bucket(label.into()),
        }
    }
}

/// Parameters for one search execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search term; blank means match everything.
    #[serde(default)]
    pub term: String,

    /// Selected facet filters.
    #[serde(default)]
    pub filters: Vec<FacetFilter>,

    /// Current page, 1-based.
    #[serde(default = "default_page")]
    pub page: usize,

    /// Results per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            term: String::new(),
            filters: Vec::new(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl SearchRequest {
    /// Offset of the first hit for the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// One matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document id assigned by the index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Relevance score (absent when sorted without scoring).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// The stored record fields.
    pub record: TranscriptionRecord,
}

/// One bucket of facet counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    /// Bucket value (value facets) or display label (range facets).
    pub value: String,
    /// Number of matching documents in the bucket.
    pub count: u64,
}

/// Per-bucket counts for one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetResult {
    /// Facet field name.
    pub field: String,
    /// Display label for the widget.
    pub label: String,
    /// Buckets in display order.
    pub buckets: Vec<FacetBucket>,
}

/// Collection of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matching documents for the current page.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents across all pages.
    pub total: u64,

    /// Facet counts over the (unfiltered-facet) result set.
    pub facets: Vec<FacetResult>,

    /// Server-side execution time in milliseconds.
    pub took_ms: u64,
}

impl SearchResults {
    /// Create empty results (the zero-hit state).
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            facets: Vec::new(),
            took_ms: 0,
        }
    }
}

/// Abstract search backend.
///
/// The Elasticsearch connector is the production implementation; tests use
/// stub backends with canned responses.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a search request.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
