//! Index bootstrap and CSV bulk import.
//!
//! Loads Common Voice transcription CSVs into the index. Two pieces:
//!
//! - [`index_body`]: the index-creation body (2 shards, 1 replica, typed
//!   mappings for the five record fields);
//! - [`CsvImporter`]: reads a CSV, coerces malformed numerics to zero
//!   rather than dropping rows, and ships documents in `_bulk` NDJSON
//!   batches.

use std::io::Read;
use std::path::Path;

use cvsearch_core::{Error, Result};

use crate::client::{BulkSummary, EsClient};
use crate::document::TranscriptionRecord;

/// Documents per `_bulk` request.
const DEFAULT_BATCH_SIZE: usize = 500;

/// Index-creation body: settings plus the typed field mappings.
pub fn index_body() -> serde_json::Value {
    serde_json::json!({
        "settings": {
            "number_of_shards": 2,
            "number_of_replicas": 1,
        },
        "mappings": {
            "properties": {
                "generated_text": { "type": "text" },
                "duration": { "type": "float" },
                "age": { "type": "integer" },
                "gender": { "type": "keyword" },
                "accent": { "type": "keyword" },
            }
        }
    })
}

/// Outcome counts of one CSV import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// CSV data rows read.
    pub rows: usize,
    /// Documents the endpoint accepted.
    pub indexed: usize,
    /// Documents the endpoint rejected.
    pub failed: usize,
}

/// CSV-to-index bulk loader.
pub struct CsvImporter<'a> {
    client: &'a EsClient,
    batch_size: usize,
}

impl<'a> CsvImporter<'a> {
    /// Create an importer with the default batch size.
    pub fn new(client: &'a EsClient) -> Self {
        Self {
            client,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the `_bulk` batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Import a CSV file.
    pub async fn import_path(&self, path: &Path) -> Result<ImportStats> {
        let file = std::fs::File::open(path)?;
        self.import_reader(file).await
    }

    /// Import CSV data from any reader.
    pub async fn import_reader<R: Read>(&self, reader: R) -> Result<ImportStats> {
        let records = read_records(reader)?;
        let mut stats = ImportStats {
            rows: records.len(),
            ..Default::default()
        };

        for batch in records.chunks(self.batch_size) {
            let payload = bulk_lines(self.client.index(), batch)?;
            let BulkSummary { indexed, failed } = self.client.bulk(payload).await?;
            stats.indexed += indexed;
            stats.failed += failed;
            log::info!(
                "Imported batch of {}: {} ok, {} failed",
                batch.len(),
                indexed,
                failed
            );
        }

        Ok(stats)
    }
}

/// Resolved positions of the record columns in a CSV header.
struct Columns {
    generated_text: usize,
    duration: usize,
    age: usize,
    gender: usize,
    accent: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let position = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::import(format!("CSV is missing column '{name}'")))
        };
        Ok(Self {
            generated_text: position("generated_text")?,
            duration: position("duration")?,
            age: position("age")?,
            gender: position("gender")?,
            accent: position("accent")?,
        })
    }
}

/// Read every CSV row into a record, coercing malformed numerics to zero.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TranscriptionRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| Error::import(format!("failed to read CSV header: {e}")))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| Error::import(format!("failed to read CSV row: {e}")))?;
        let field = |index: usize| row.get(index).unwrap_or_default();

        records.push(TranscriptionRecord {
            generated_text: field(columns.generated_text).to_string(),
            duration: TranscriptionRecord::parse_duration(field(columns.duration)),
            age: TranscriptionRecord::parse_age(field(columns.age)),
            gender: field(columns.gender).to_string(),
            accent: field(columns.accent).to_string(),
        });
    }
    Ok(records)
}

/// Build the NDJSON payload for one `_bulk` batch: an action line and a
/// document line per record, newline-terminated.
pub fn bulk_lines(index: &str, records: &[TranscriptionRecord]) -> Result<String> {
    let action = serde_json::to_string(&serde_json::json!({
        "index": { "_index": index }
    }))?;

    let mut payload = String::new();
    for record in records {
        payload.push_str(&action);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(record)?);
        payload.push('\n');
    }
    Ok(payload)
}

// ============================================================================
// Tests
// ============================================================================
