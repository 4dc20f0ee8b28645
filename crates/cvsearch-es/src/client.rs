//! Elasticsearch HTTP client.
//!
//! A thin `reqwest` wrapper for the handful of endpoints this crate uses:
//! `_search`, index creation, `_bulk`, `_count`, and the root ping. The
//! client owns no query semantics; bodies are built by
//! [`QueryBuilder`](crate::query::QueryBuilder) and the importer.
//!
//! Non-2xx responses surface as [`Error::Endpoint`] with the status and a
//! truncated body; transport failures keep their source error attached.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use cvsearch_core::{EndpointSettings, Error, Result};

use crate::response::EsSearchResponse;

/// Outcome of an index-creation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateIndexOutcome {
    /// The index was created.
    Created,
    /// The index already existed; mappings were left untouched.
    AlreadyExists,
}

/// Outcome counts of a `_bulk` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    /// Operations the endpoint accepted.
    pub indexed: usize,
    /// Operations the endpoint rejected.
    pub failed: usize,
}

/// HTTP client for one Elasticsearch node and index.
#[derive(Debug, Clone)]
pub struct EsClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

impl EsClient {
    /// Build a client from endpoint settings.
    pub fn new(settings: &EndpointSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::transport_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            http,
            base_url: settings.url.trim_end_matches('/').to_string(),
            index: settings.index.clone(),
        })
    }

    /// The configured index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// URL for an index-scoped path (empty suffix addresses the index
    /// itself).
    fn index_url(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("{}/{}", self.base_url, self.index)
        } else {
            format!("{}/{}/{}", self.base_url, self.index, suffix)
        }
    }

    /// Check the node is reachable.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| Error::transport_with_source("ping failed", e))?;
        Self::ensure_success(response).await.map(|_| ())
    }

    /// Execute a `_search` body against the index.
    pub async fn search(&self, body: &serde_json::Value) -> Result<EsSearchResponse> {
        log::debug!("POST {} body={}", self.index_url("_search"), body);

        let response = self
            .http
            .post(self.index_url("_search"))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport_with_source("search request failed", e))?;

        let text = Self::ensure_success(response).await?;
        serde_json::from_str(&text)
            .map_err(|e| Error::unexpected_response(format!("malformed search response: {e}")))
    }

    /// Create the index with the given settings/mappings body.
    ///
    /// An index that already exists is not an error; the existing mappings
    /// are left as they are.
    pub async fn create_index(&self, body: &serde_json::Value) -> Result<CreateIndexOutcome> {
        let response = self
            .http
            .put(self.index_url(""))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport_with_source("index creation failed", e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport_with_source("failed to read response body", e))?;
        classify_create_index(status, &text)
    }

    /// Send an NDJSON `_bulk` payload.
    pub async fn bulk(&self, ndjson: String) -> Result<BulkSummary> {
        let response = self
            .http
            .post(self.index_url("_bulk"))
            .header("content-type", "application/x-ndjson")
            .body(ndjson)
            .send()
            .await
            .map_err(|e| Error::transport_with_source("bulk request failed", e))?;

        let text = Self::ensure_success(response).await?;
        let bulk: EsBulkResponse = serde_json::from_str(&text)
            .map_err(|e| Error::unexpected_response(format!("malformed bulk response: {e}")))?;
        Ok(bulk.summarize())
    }

    /// Count documents in the index.
    pub async fn count(&self) -> Result<u64> {
        let response = self
            .http
            .get(self.index_url("_count"))
            .send()
            .await
            .map_err(|e| Error::transport_with_source("count request failed", e))?;

        let text = Self::ensure_success(response).await?;
        let count: EsCountResponse = serde_json::from_str(&text)
            .map_err(|e| Error::unexpected_response(format!("malformed count response: {e}")))?;
        Ok(count.count)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport_with_source("failed to read response body", e))?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(Error::endpoint(status.as_u16(), text))
        }
    }
}

fn classify_create_index(status: u16, body: &str) -> Result<CreateIndexOutcome> {
    if (200..300).contains(&status) {
        return Ok(CreateIndexOutcome::Created);
    }
    if status == 400 && body.contains("resource_already_exists_exception") {
        return Ok(CreateIndexOutcome::AlreadyExists);
    }
    Err(Error::endpoint(status, body))
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct EsCountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct EsBulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, EsBulkItem>>,
}

#[derive(Debug, Deserialize)]
struct EsBulkItem {
    status: u16,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl EsBulkResponse {
    fn summarize(self) -> BulkSummary {
        let mut summary = BulkSummary::default();
        for item in self.items {
            // Each item has exactly one action key ("index", "create", ...)
            let ok = item
                .values()
                .next()
                .map(|op| op.error.is_none() && op.status < 300)
                .unwrap_or(false);
            if ok {
                summary.indexed += 1;
            } else {
                summary.failed += 1;
            }
        }
        if self.errors && summary.failed == 0 {
            log::warn!("Bulk response flagged errors but no failed item was found");
        }
        summary
    }
}

// ============================================================================
// Tests
// ============================================================================
