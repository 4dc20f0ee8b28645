//! Transcription record representation.
//!
//! `TranscriptionRecord` is the typed form of a `_source` document in the
//! transcription index. Field types mirror the index mappings:
//! `generated_text` text, `duration` float, `age` integer, `gender` and
//! `accent` keyword.

use serde::{Deserialize, Serialize};

/// One transcription document as stored in the index.
///
/// All fields default when absent: older documents may miss metadata
/// columns, and the importer coerces malformed numerics to zero rather
/// than dropping rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionRecord {
    /// Transcribed text produced by the speech-to-text pass.
    #[serde(default)]
    pub generated_text: String,

    /// Clip duration in seconds.
    #[serde(default)]
    pub duration: f64,

    /// Speaker age in years (0 when unknown).
    #[serde(default)]
    pub age: u32,

    /// Speaker gender label.
    #[serde(default)]
    pub gender: String,

    /// Speaker accent label.
    #[serde(default)]
    pub accent: String,
}

impl TranscriptionRecord {
    /// Parse an age column value the way the original loader does:
    /// a string of digits parses, anything else becomes 0.
    pub fn parse_age(raw: &str) -> u32 {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            trimmed.parse().unwrap_or(0)
        } else {
            0
        }
    }

    /// Parse a duration column value; anything non-numeric becomes 0.0.
    pub fn parse_duration(raw: &str) -> f64 {
        raw.trim().parse().unwrap_or(0.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
