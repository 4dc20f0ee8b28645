//! Search schema definition for the transcription index.
//!
//! This module defines the static descriptor consumed by the query builder:
//! which fields participate in free-text search, which fields are echoed
//! back per result, and how the three facets are bucketed.
//!
//! # Schema Fields
//!
//! | Field | Index type | Searchable | Result | Facet |
//! |-------|-----------|------------|--------|-------|
//! | `generated_text` | text | yes | raw | no |
//! | `duration` | float | yes | raw | no |
//! | `age` | integer | yes | raw | range |
//! | `gender` | keyword | yes | raw | value |
//! | `accent` | keyword | yes | raw | value |
//!
//! # Age Buckets
//!
//! The `age` facet uses three inclusive/inclusive buckets: `18-30`, `31-50`
//! and `51+` (internally capped at 100). The buckets are pairwise disjoint
//! and jointly cover every age in `[18, 100]`; 30 and 31 land in different
//! buckets. The query builder is responsible for preserving this boundary
//! policy on the wire (Elasticsearch range aggregations treat `to` as
//! exclusive).
//!
//! The descriptor is constructed once at startup and treated as read-only
//! for the life of the process.

use serde::{Deserialize, Serialize};

use cvsearch_core::{Error, Result};

/// A field participating in free-text search.
///
/// Options (per-field boosting, analyzers) are intentionally empty; the
/// index defaults apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchField {
    /// Field name as mapped in the index.
    pub name: String,
}

/// A field echoed back per matching document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultField {
    /// Field name as mapped in the index.
    pub name: String,
    /// Return the raw stored value (as opposed to a processed form).
    pub raw: bool,
}

/// One bucket of a numeric range facet.
///
/// Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBucket {
    /// Inclusive lower bound.
    pub from: u32,
    /// Inclusive upper bound.
    pub to: u32,
    /// Display label (e.g. `51+`).
    pub label: String,
}

impl RangeBucket {
    /// Create a new bucket.
    pub fn new(from: u32, to: u32, label: impl Into<String>) -> Self {
        Self {
            from,
            to,
            label: label.into(),
        }
    }

    /// Whether a value falls inside this bucket (inclusive both ends).
    pub fn contains(&self, value: u32) -> bool {
        value >= self.from && value <= self.to
    }
}

/// How a facet partitions the result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FacetKind {
    /// Discrete bucketing by exact field value (categorical).
    Value,
    /// Ordered, disjoint numeric ranges with display labels.
    Range {
        /// Bucket list, in display order.
        buckets: Vec<RangeBucket>,
    },
}

/// A facet definition over one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSpec {
    /// Field name as mapped in the index.
    pub field: String,
    /// Display label for the facet widget.
    pub label: String,
    /// Bucketing strategy.
    #[serde(flatten)]
    pub kind: FacetKind,
}

impl FacetSpec {
    /// Create a value (categorical) facet.
    pub fn value(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            kind: FacetKind::Value,
        }
    }

    /// Create a range facet over the given buckets.
    pub fn range(
        field: impl Into<String>,
        label: impl Into<String>,
        buckets: Vec<RangeBucket>,
    ) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            kind: FacetKind::Range { buckets },
        }
    }

    /// Look up a range bucket by display label.
    ///
    /// Returns `None` for value facets.
    pub fn bucket(&self, label: &str) -> Option<&RangeBucket> {
        match &self.kind {
            FacetKind::Value => None,
            FacetKind::Range { buckets } => buckets.iter().find(|b| b.label == label),
        }
    }
}

/// The static search configuration descriptor.
///
/// Pure data: no computation, no I/O. Constructed once, then shared
/// read-only between the query builder, the page, and the importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSchema {
    /// Fields participating in free-text search.
    pub search_fields: Vec<SearchField>,
    /// Fields echoed back per result.
    pub result_fields: Vec<ResultField>,
    /// Facet definitions, in display order.
    pub facets: Vec<FacetSpec>,
}

impl SearchSchema {
    /// Build the transcription-index schema.
    ///
    /// Five searchable fields, the same five returned raw, and three
    /// facets: `gender` (value), `age` (range), `accent` (value).
    pub fn transcriptions() -> Self {
        let field_names = ["generated_text", "duration", "age", "gender", "accent"];

        Self {
            search_fields: field_names
                .iter()
                .map(|name| SearchField {
                    name: (*name).to_string(),
                })
                .collect(),
            result_fields: field_names
                .iter()
                .map(|name| ResultField {
                    name: (*name).to_string(),
                    raw: true,
                })
                .collect(),
            facets: vec![
                FacetSpec::value("gender", "Gender"),
                FacetSpec::range(
                    "age",
                    "Age",
                    vec![
                        RangeBucket::new(18, 30, "18-30"),
                        RangeBucket::new(31, 50, "31-50"),
                        RangeBucket::new(51, 100, "51+"),
                    ],
                ),
                FacetSpec::value("accent", "Accent"),
            ],
        }
    }

    /// Names of the searchable fields, in declaration order.
    pub fn search_field_names(&self) -> Vec<&str> {
        self.search_fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Names of the result fields, in declaration order.
    pub fn result_field_names(&self) -> Vec<&str> {
        self.result_fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a facet by field name.
    pub fn facet(&self, field: &str) -> Option<&FacetSpec> {
        self.facets.iter().find(|f| f.field == field)
    }

    /// Resolve a range bucket, with typed errors for unknown facets
    /// and labels.
    pub fn resolve_bucket(&self, field: &str, label: &str) -> Result<&RangeBucket> {
        let facet = self.facet(field).ok_or_else(|| Error::FacetNotFound {
            field: field.to_string(),
        })?;
        facet.bucket(label).ok_or_else(|| Error::BucketNotFound {
            field: field.to_string(),
            label: label.to_string(),
        })
    }

    /// Check cross-declaration consistency.
    ///
    /// Every searchable field must also appear among the result fields or
    /// facets (a name present in only one list is almost certainly a typo),
    /// and every range facet must have disjoint, gap-free buckets in
    /// ascending order.
    pub fn validate(&self) -> Result<()> {
        for search_field in &self.search_fields {
            let in_results = self
                .result_fields
                .iter()
                .any(|f| f.name == search_field.name);
            let in_facets = self.facets.iter().any(|f| f.field == search_field.name);
            if !in_results && !in_facets {
                return Err(Error::config(format!(
                    "search field '{}' appears in no result or facet declaration",
                    search_field.name
                )));
            }
        }

        for facet in &self.facets {
            let FacetKind::Range { buckets } = &facet.kind else {
                continue;
            };
            if buckets.is_empty() {
                return Err(Error::config(format!(
                    "range facet '{}' has no buckets",
                    facet.field
                )));
            }
            for bucket in buckets {
                if bucket.from > bucket.to {
                    return Err(Error::config(format!(
                        "range facet '{}' bucket '{}' has from > to",
                        facet.field, bucket.label
                    )));
                }
            }
            for pair in buckets.windows(2) {
                if pair[1].from != pair[0].to + 1 {
                    return Err(Error::config(format!(
                        "range facet '{}' buckets '{}' and '{}' are not contiguous",
                        facet.field, pair[0].label, pair[1].label
                    )));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
