//! Elasticsearch wire-format response types.
//!
//! Typed serde models for the subset of the `_search` response this crate
//! consumes: hit list with totals, and `terms`/`range` aggregation buckets.
//! `into_results` translates the wire form into the domain-level
//! [`SearchResults`](crate::backend::SearchResults), using the schema to
//! order facets and to report zero-count range buckets.

use std::collections::HashMap;

use serde::Deserialize;

use cvsearch_core::{Error, Result};

use crate::backend::{FacetBucket, FacetResult, SearchHit, SearchResults};
use crate::document::TranscriptionRecord;
use crate::schema::SearchSchema;

/// Top-level `_search` response.
#[derive(Debug, Deserialize)]
pub struct EsSearchResponse {
    /// Server-side execution time in milliseconds.
    pub took: u64,

    /// Whether the search timed out.
    pub timed_out: bool,

    /// Hit list and totals.
    pub hits: EsHits,

    /// Aggregation results, keyed by aggregation name.
    #[serde(default)]
    pub aggregations: Option<HashMap<String, EsAggregation>>,
}

/// The `hits` envelope.
#[derive(Debug, Deserialize)]
pub struct EsHits {
    /// Total matching documents.
    pub total: Option<EsTotal>,

    /// Hits for the requested page.
    pub hits: Vec<EsHit>,
}

/// Total hit count with its relation.
#[derive(Debug, Deserialize)]
pub struct EsTotal {
    /// The count value.
    pub value: u64,

    /// `eq` for exact counts, `gte` when the count is a lower bound.
    pub relation: EsTotalRelation,
}

/// Relation qualifier on the total hit count.
#[derive(Debug, PartialEq, Eq, Deserialize)]
pub enum EsTotalRelation {
    /// Exact count.
    #[serde(rename = "eq")]
    Eq,
    /// Lower bound (`track_total_hits` limit reached).
    #[serde(rename = "gte")]
    Gte,
}

/// One hit.
#[derive(Debug, Deserialize)]
pub struct EsHit {
    /// Document id.
    #[serde(rename = "_id")]
    pub id: Option<String>,

    /// Relevance score.
    #[serde(rename = "_score")]
    pub score: Option<f64>,

    /// Stored fields, shaped by the request's `_source` list.
    #[serde(rename = "_source")]
    pub source: Option<serde_json::Value>,
}

/// One aggregation result (terms or range; both carry `buckets`).
#[derive(Debug, Deserialize)]
pub struct EsAggregation {
    /// Buckets in response order.
    #[serde(default)]
    pub buckets: Vec<EsAggregationBucket>,
}

/// One aggregation bucket.
#[derive(Debug, Deserialize)]
pub struct EsAggregationBucket {
    /// Bucket key: a string for `terms` on keyword fields and for keyed
    /// ranges, a number for numeric `terms`.
    pub key: serde_json::Value,

    /// Matching document count.
    pub doc_count: u64,
}

impl EsAggregationBucket {
    /// The bucket key as display text.
    pub fn key_text(&self) -> String {
        match &self.key {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl EsSearchResponse {
    /// Translate the wire response into domain results.
    ///
    /// Facets follow schema declaration order. A facet missing from the
    /// response aggregations (e.g. zero documents in a `terms` facet)
    /// yields an empty bucket list rather than an error.
    pub fn into_results(self, schema: &SearchSchema) -> Result<SearchResults> {
        if self.timed_out {
            log::warn!("Search reported a server-side timeout; results may be partial");
        }

        let total = self.hits.total.as_ref().map(|t| t.value).unwrap_or(0);

        let hits = self
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let record = match hit.source {
                    Some(source) => serde_json::from_value::<TranscriptionRecord>(source)
                        .map_err(|e| {
                            Error::unexpected_response(format!("malformed _source: {e}"))
                        })?,
                    None => TranscriptionRecord::default(),
                };
                Ok(SearchHit {
                    id: hit.id,
                    score: hit.score,
                    record,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut aggregations = self.aggregations.unwrap_or_default();
        let facets = schema
            .facets
            .iter()
            .map(|facet| {
                let buckets = aggregations
                    .remove(&facet.field)
                    .map(|agg| {
                        agg.buckets
                            .into_iter()
                            .map(|b| FacetBucket {
                                value: b.key_text(),
                                count: b.doc_count,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                FacetResult {
                    field: facet.field.clone(),
                    label: facet.label.clone(),
                    buckets,
                }
            })
            .collect();

        Ok(SearchResults {
            hits,
            total,
            facets,
            took_ms: self.took,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A trimmed capture of a real `_search` response against the
    /// transcription index.
    const SEARCH_RESPONSE: &str = r#"{
        "took": 7,
        "timed_out": false,
        "_shards": { "total": 2, "successful": 2, "skipped": 0, "failed": 0 },
        "hits": {
            "total": { "value": 2, "relation": "eq" },
            "max_score": 1.92,
            "hits": [
                {
                    "_index": "cv-transcriptions",
                    "_id": "S1KcXY4BUo",
                    "_score": 1.92,
                    "_source": {
                        "generated_text": "LEARN TO RECOGNIZE OMENS",
                        "duration": 4.62,
                        "age": 28,
                        "gender": "female",
                        "accent": "england"
                    }
                },
                {
                    "_index": "cv-transcriptions",
                    "_id": "S1KcXY4BUp",
                    "_score": 1.14,
                    "_source": {
                        "generated_text": "AND FOLLOW THEM",
                        "duration": 2.2,
                        "age": 47,
                        "gender": "male",
                        "accent": "us"
                    }
                }
            ]
        },
        "aggregations": {
            "gender": {
                "doc_count_error_upper_bound": 0,
                "sum_other_doc_count": 0,
                "buckets": [
                    { "key": "female", "doc_count": 1 },
                    { "key": "male", "doc_count": 1 }
                ]
            },
            "age": {
                "buckets": [
                    { "key": "18-30", "from": 18.0, "to": 31.0, "doc_count": 1 },
                    { "key": "31-50", "from": 31.0, "to": 51.0, "doc_count": 1 },
                    { "key": "51+", "from": 51.0, "to": 101.0, "doc_count": 0 }
                ]
            },
            "accent": {
                "doc_count_error_upper_bound": 0,
                "sum_other_doc_count": 0,
                "buckets": [
                    { "key": "england", "doc_count": 1 },
                    { "key": "us", "doc_count": 1 }
                ]
            }
        }
    }"#;

    const EMPTY_RESPONSE: &str = r#"{
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": { "value": 0, "relation": "eq" },
            "hits": []
        },
        "aggregations": {
            "gender": { "buckets": [] },
            "age": {
                "buckets": [
                    { "key": "18-30", "from": 18.0, "to": 31.0, "doc_count": 0 },
                    { "key": "31-50", "from": 31.0, "to": 51.0, "doc_count": 0 },
                    { "key": "51+", "from": 51.0, "to": 101.0, "doc_count": 0 }
                ]
            },
            "accent": { "buckets": [] }
        }
    }"#;

    #[test]
    fn test_parse_search_response() {
        let response: EsSearchResponse = serde_json::from_str(SEARCH_RESPONSE).unwrap();
        assert_eq!(response.took, 7);
        assert!(!response.timed_out);
        assert_eq!(response.hits.hits.len(), 2);

        let total = response.hits.total.as_ref().unwrap();
        assert_eq!(total.value, 2);
        assert_eq!(total.relation, EsTotalRelation::Eq);
    }

    #[test]
    fn test_into_results() {
        let schema = SearchSchema::transcriptions();
        let response: EsSearchResponse = serde_json::from_str(SEARCH_RESPONSE).unwrap();
        let results = response.into_results(&schema).unwrap();

        assert_eq!(results.total, 2);
        assert_eq!(results.took_ms, 7);
        assert_eq!(results.hits.len(), 2);

        let first = &results.hits[0];
        assert_eq!(first.id.as_deref(), Some("S1KcXY4BUo"));
        assert_eq!(first.record.generated_text, "LEARN TO RECOGNIZE OMENS");
        assert_eq!(first.record.age, 28);

        // Facets come back in schema order with widget labels
        let fields: Vec<&str> = results.facets.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["gender", "age", "accent"]);
        assert_eq!(results.facets[1].label, "Age");

        let age_buckets = &results.facets[1].buckets;
        assert_eq!(age_buckets.len(), 3);
        assert_eq!(age_buckets[0].value, "18-30");
        assert_eq!(age_buckets[0].count, 1);
        assert_eq!(age_buckets[2].value, "51+");
        assert_eq!(age_buckets[2].count, 0);
    }

    #[test]
    fn test_zero_hit_response() {
        let schema = SearchSchema::transcriptions();
        let response: EsSearchResponse = serde_json::from_str(EMPTY_RESPONSE).unwrap();
        let results = response.into_results(&schema).unwrap();

        assert_eq!(results.total, 0);
        assert!(results.hits.is_empty());
        // All three facets still render, range buckets at zero
        assert_eq!(results.facets.len(), 3);
        assert!(results.facets[0].buckets.is_empty());
        assert_eq!(results.facets[1].buckets.len(), 3);
        assert!(results.facets[1].buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_missing_aggregations_yield_empty_facets() {
        let schema = SearchSchema::transcriptions();
        let response: EsSearchResponse = serde_json::from_str(
            r#"{ "took": 1, "timed_out": false, "hits": { "total": null, "hits": [] } }"#,
        )
        .unwrap();
        let results = response.into_results(&schema).unwrap();
        assert_eq!(results.total, 0);
        assert_eq!(results.facets.len(), 3);
        assert!(results.facets.iter().all(|f| f.buckets.is_empty()));
    }

    #[test]
    fn test_malformed_source_is_an_error() {
        let schema = SearchSchema::transcriptions();
        let response: EsSearchResponse = serde_json::from_str(
            r#"{
                "took": 1,
                "timed_out": false,
                "hits": {
                    "total": { "value": 1, "relation": "eq" },
                    "hits": [ { "_id": "x", "_score": 1.0, "_source": { "age": "not-a-number" } } ]
                }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            response.into_results(&schema),
            Err(cvsearch_core::Error::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn test_numeric_bucket_keys_render_as_text() {
        let bucket = EsAggregationBucket {
            key: serde_json::json!(42),
            doc_count: 7,
        };
        assert_eq!(bucket.key_text(), "42");
    }
}
