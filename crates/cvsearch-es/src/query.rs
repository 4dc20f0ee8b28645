//! Query building.
//!
//! `QueryBuilder` translates the search schema plus one `SearchRequest`
//! into a single Elasticsearch `_search` body:
//!
//! - free text becomes a `multi_match` over the searchable fields
//!   (`lenient` so text terms don't error against numeric fields); a blank
//!   term becomes `match_all`;
//! - every configured facet becomes an `aggs` entry (`terms` for value
//!   facets, `range` for range facets);
//! - selected filters become a `post_filter`, so facet counts are computed
//!   over the pre-filter result set and a selection does not zero out its
//!   sibling buckets;
//! - paging becomes `from`/`size`, result fields become `_source`.
//!
//! # Range boundary policy
//!
//! Schema buckets are inclusive on both ends. Elasticsearch range
//! aggregations treat `to` as exclusive, so the builder emits `to = hi + 1`
//! for aggregations and `gte`/`lte` for filters. Either way a document with
//! `age = 30` counts for `18-30` only and `age = 31` for `31-50` only.

use serde_json::json;

use cvsearch_core::Result;

use crate::backend::{FacetFilter, FilterValue, SearchRequest};
use crate::schema::{FacetKind, SearchSchema};

/// Number of value-facet buckets requested per aggregation.
///
/// Large enough for the label sets in this index (genders, accents).
const VALUE_FACET_SIZE: usize = 50;

/// Builder for Elasticsearch `_search` bodies.
pub struct QueryBuilder<'a> {
    schema: &'a SearchSchema,
}

impl<'a> QueryBuilder<'a> {
    /// Create a builder over the given schema.
    pub fn new(schema: &'a SearchSchema) -> Self {
        Self { schema }
    }

    /// Build the `_search` body for one request.
    ///
    /// Fails when a filter references a facet or bucket the schema does
    /// not define.
    pub fn build(&self, request: &SearchRequest) -> Result<serde_json::Value> {
        let mut body = json!({
            "query": self.text_query(&request.term),
            "aggs": self.aggs_argument(),
            "from": request.offset(),
            "size": request.page_size,
            "_source": self.schema.result_field_names(),
            "track_total_hits": true,
        });

        if !request.filters.is_empty() {
            body["post_filter"] = self.post_filter(&request.filters)?;
        }

        Ok(body)
    }

    fn text_query(&self, term: &str) -> serde_json::Value {
        let term = term.trim();
        if term.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({
                "multi_match": {
                    "query": term,
                    "fields": self.schema.search_field_names(),
                    "lenient": true,
                }
            })
        }
    }

    fn post_filter(&self, filters: &[FacetFilter]) -> Result<serde_json::Value> {
        // One clause group per facet field: selections within a field are
        // OR-ed, fields are AND-ed.
        let mut field_order: Vec<&str> = Vec::new();
        for filter in filters {
            if !field_order.contains(&filter.field.as_str()) {
                field_order.push(&filter.field);
            }
        }

        let mut must = Vec::new();
        for field in field_order {
            let clauses = filters
                .iter()
                .filter(|f| f.field == field)
                .map(|f| self.filter_clause(f))
                .collect::<Result<Vec<_>>>()?;

            if clauses.len() == 1 {
                must.push(clauses.into_iter().next().unwrap_or_default());
            } else {
                must.push(json!({
                    "bool": {
                        "should": clauses,
                        "minimum_should_match": 1,
                    }
                }));
            }
        }

        if must.len() == 1 {
            Ok(must.into_iter().next().unwrap_or_default())
        } else {
            Ok(json!({ "bool": { "must": must } }))
        }
    }

    fn filter_clause(&self, filter: &FacetFilter) -> Result<serde_json::Value> {
        match &filter.value {
            FilterValue::Term(value) => Ok(json!({
                "term": { &filter.field: value }
            })),
            FilterValue::Bucket(label) => {
                let bucket = self.schema.resolve_bucket(&filter.field, label)?;
                Ok(json!({
                    "range": {
                        &filter.field: {
                            "gte": bucket.from,
                            "lte": bucket.to,
                        }
                    }
                }))
            }
        }
    }

    fn aggs_argument(&self) -> serde_json::Value {
        let mut aggs = serde_json::Map::new();

        for facet in &self.schema.facets {
            let agg = match &facet.kind {
                FacetKind::Value => json!({
                    "terms": {
                        "field": facet.field,
                        "size": VALUE_FACET_SIZE,
                    }
                }),
                FacetKind::Range { buckets } => {
                    let ranges: Vec<serde_json::Value> = buckets
                        .iter()
                        .map(|b| {
                            json!({
                                "key": b.label,
                                "from": b.from,
                                // Range aggregations are to-exclusive
                                "to": b.to + 1,
                            })
                        })
                        .collect();
                    json!({
                        "range": {
                            "field": facet.field,
                            "ranges": ranges,
                        }
                    })
                }
            };
            aggs.insert(facet.field.clone(), agg);
        }

        serde_json::Value::Object(aggs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::FacetFilter;

    fn build(request: &SearchRequest) -> serde_json::Value {
        let schema = SearchSchema::transcriptions();
        QueryBuilder::new(&schema).build(request).unwrap()
    }

    #[test]
    fn test_blank_term_is_match_all() {
        let body = build(&SearchRequest::default());
        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert!(body.get("post_filter").is_none());
    }

    #[test]
    fn test_whitespace_term_is_match_all() {
        let body = build(&SearchRequest {
            term: "   ".to_string(),
            ..Default::default()
        });
        assert_eq!(body["query"], json!({ "match_all": {} }));
    }

    #[test]
    fn test_text_term_is_lenient_multi_match() {
        let body = build(&SearchRequest {
            term: "seven years".to_string(),
            ..Default::default()
        });
        let multi_match = &body["query"]["multi_match"];
        assert_eq!(multi_match["query"], "seven years");
        assert_eq!(multi_match["lenient"], true);
        assert_eq!(
            multi_match["fields"],
            json!(["generated_text", "duration", "age", "gender", "accent"])
        );
    }

    #[test]
    fn test_paging_arguments() {
        let body = build(&SearchRequest {
            page: 3,
            page_size: 20,
            ..Default::default()
        });
        assert_eq!(body["from"], 40);
        assert_eq!(body["size"], 20);
        assert_eq!(body["track_total_hits"], true);
    }

    #[test]
    fn test_source_lists_result_fields() {
        let body = build(&SearchRequest::default());
        assert_eq!(
            body["_source"],
            json!(["generated_text", "duration", "age", "gender", "accent"])
        );
    }

    #[test]
    fn test_single_term_filter() {
        let body = build(&SearchRequest {
            filters: vec![FacetFilter::term("gender", "female")],
            ..Default::default()
        });
        assert_eq!(
            body["post_filter"],
            json!({ "term": { "gender": "female" } })
        );
    }

    #[test]
    fn test_bucket_filter_boundaries() {
        // Inclusive both ends: age 30 matches 18-30 and not 31-50.
        let body = build(&SearchRequest {
            filters: vec![FacetFilter::bucket("age", "18-30")],
            ..Default::default()
        });
        assert_eq!(
            body["post_filter"],
            json!({ "range": { "age": { "gte": 18, "lte": 30 } } })
        );

        let body = build(&SearchRequest {
            filters: vec![FacetFilter::bucket("age", "31-50")],
            ..Default::default()
        });
        assert_eq!(
            body["post_filter"],
            json!({ "range": { "age": { "gte": 31, "lte": 50 } } })
        );
    }

    #[test]
    fn test_filters_or_within_field_and_across_fields() {
        let body = build(&SearchRequest {
            filters: vec![
                FacetFilter::term("gender", "female"),
                FacetFilter::term("gender", "male"),
                FacetFilter::bucket("age", "51+"),
            ],
            ..Default::default()
        });

        let must = body["post_filter"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 2);

        let gender_group = &must[0]["bool"];
        assert_eq!(gender_group["minimum_should_match"], 1);
        assert_eq!(gender_group["should"].as_array().unwrap().len(), 2);

        assert_eq!(
            must[1],
            json!({ "range": { "age": { "gte": 51, "lte": 100 } } })
        );
    }

    #[test]
    fn test_unknown_facet_filter_fails() {
        let schema = SearchSchema::transcriptions();
        let request = SearchRequest {
            filters: vec![FacetFilter::term("speaker", "alice")],
            ..Default::default()
        };
        // Term filters on unconfigured fields pass through to the index,
        // but bucket filters must resolve against the schema.
        let term_body = QueryBuilder::new(&schema).build(&request);
        assert!(term_body.is_ok());

        let request = SearchRequest {
            filters: vec![FacetFilter::bucket("speaker", "18-30")],
            ..Default::default()
        };
        assert!(matches!(
            QueryBuilder::new(&schema).build(&request),
            Err(cvsearch_core::Error::FacetNotFound { .. })
        ));
    }

    #[test]
    fn test_aggregations_cover_all_facets() {
        let body = build(&SearchRequest::default());
        let aggs = body["aggs"].as_object().unwrap();
        assert_eq!(aggs.len(), 3);

        assert_eq!(aggs["gender"]["terms"]["field"], "gender");
        assert_eq!(aggs["accent"]["terms"]["field"], "accent");

        // Range aggregation shifts the exclusive `to` bound by one to
        // preserve the inclusive bucket contract.
        let ranges = aggs["age"]["range"]["ranges"].as_array().unwrap();
        assert_eq!(
            *ranges,
            vec![
                json!({ "key": "18-30", "from": 18, "to": 31 }),
                json!({ "key": "31-50", "from": 31, "to": 51 }),
                json!({ "key": "51+", "from": 51, "to": 101 }),
            ]
        );
    }

    #[test]
    fn test_body_is_stable_across_builds() {
        let request = SearchRequest {
            term: "experience".to_string(),
            filters: vec![FacetFilter::term("accent", "england")],
            page: 2,
            page_size: 10,
        };
        assert_eq!(build(&request), build(&request));
    }
}
