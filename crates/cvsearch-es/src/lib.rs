#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Elasticsearch connector for cvsearch.
//!
//! This crate owns everything between the search page's state and the
//! index: the static search configuration descriptor, query building,
//! wire-format parsing, the HTTP client, and the CSV importer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       cvsearch-es                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchBackend trait                                        │
//! │  └── ElasticsearchConnector (schema + client)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchSchema (fields + three facets)                       │
//! │  QueryBuilder (search state → _search body)                 │
//! │  EsSearchResponse (wire form → SearchResults)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EsClient (_search, index creation, _bulk, _count, ping)    │
//! │  CsvImporter (Common Voice CSV → _bulk batches)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cvsearch_core::Settings;
//! use cvsearch_es::{ElasticsearchConnector, FacetFilter, SearchBackend, SearchRequest};
//!
//! let settings = Settings::load(None)?;
//! let connector = ElasticsearchConnector::new(&settings.elasticsearch)?;
//!
//! let request = SearchRequest {
//!     term: "omens".to_string(),
//!     filters: vec![FacetFilter::bucket("age", "18-30")],
//!     ..Default::default()
//! };
//!
//! let results = connector.search(&request).await?;
//! println!("{} matches", results.total);
//! ```

pub mod backend;
pub mod client;
pub mod connector;
pub mod document;
pub mod importer;
pub mod query;
pub mod response;
pub mod schema;

// Re-exports
pub use backend::{
    FacetBucket, FacetFilter, FacetResult, FilterValue, SearchBackend, SearchHit, SearchRequest,
    SearchResults,
};
pub use client::{BulkSummary, CreateIndexOutcome, EsClient};
pub use connector::ElasticsearchConnector;
pub use document::TranscriptionRecord;
pub use importer::{CsvImporter, ImportStats, index_body};
pub use query::QueryBuilder;
pub use response::EsSearchResponse;
pub use schema::{FacetKind, FacetSpec, RangeBucket, ResultField, SearchField, SearchSchema};
