//! The Elasticsearch connector.
//!
//! `ElasticsearchConnector` glues the static [`SearchSchema`] to the HTTP
//! [`EsClient`]: it builds the `_search` body for a request, executes it,
//! and translates the wire response back into domain results. It is the
//! production [`SearchBackend`] implementation.

use async_trait::async_trait;

use cvsearch_core::{EndpointSettings, Result};

use crate::backend::{SearchBackend, SearchRequest, SearchResults};
use crate::client::EsClient;
use crate::query::QueryBuilder;
use crate::schema::SearchSchema;

/// Adapter between search state and the Elasticsearch index.
#[derive(Debug, Clone)]
pub struct ElasticsearchConnector {
    schema: SearchSchema,
    client: EsClient,
}

impl ElasticsearchConnector {
    /// Create a connector for the given endpoint, using the transcription
    /// schema.
    pub fn new(settings: &EndpointSettings) -> Result<Self> {
        Self::with_schema(settings, SearchSchema::transcriptions())
    }

    /// Create a connector with an explicit schema.
    pub fn with_schema(settings: &EndpointSettings, schema: SearchSchema) -> Result<Self> {
        schema.validate()?;
        let client = EsClient::new(settings)?;
        Ok(Self { schema, client })
    }

    /// The configuration descriptor this connector searches with.
    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    /// The underlying HTTP client (index bootstrap, imports, health).
    pub fn client(&self) -> &EsClient {
        &self.client
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchConnector {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let body = QueryBuilder::new(&self.schema).build(request)?;
        let response = self.client.search(&body).await?;
        let results = response.into_results(&self.schema)?;
        log::debug!(
            "search term='{}' filters={} -> {} of {} hits in {}ms",
            request.term,
            request.filters.len(),
            results.hits.len(),
            results.total,
            results.took_ms,
        );
        Ok(results)
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_construction() {
        let connector = ElasticsearchConnector::new(&EndpointSettings::default()).unwrap();
        assert_eq!(connector.name(), "elasticsearch");
        assert_eq!(connector.schema().facets.len(), 3);
        assert_eq!(connector.client().index(), "cv-transcriptions");
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let schema = SearchSchema {
            search_fields: vec![crate::schema::SearchField {
                name: "typo_field".to_string(),
            }],
            result_fields: vec![],
            facets: vec![],
        };
        assert!(ElasticsearchConnector::with_schema(&EndpointSettings::default(), schema).is_err());
    }
}
