//! Endpoint and page settings.
//!
//! Settings resolve in three layers, later layers winning:
//!
//! 1. Built-in defaults (`http://localhost:9200`, index `cv-transcriptions`)
//! 2. An optional TOML file
//! 3. Environment variables (`CVSEARCH_ES_URL`, `CVSEARCH_ES_INDEX`,
//!    `CVSEARCH_ES_TIMEOUT_SECS`, `CVSEARCH_PAGE_SIZE`)
//!
//! The defaults deliberately match a local, unauthenticated development
//! cluster; deployments override them via file or environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Search endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Base URL of the Elasticsearch node.
    #[serde(default = "default_url")]
    pub url: String,

    /// Index name to search and write.
    #[serde(default = "default_index")]
    pub index: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Result page settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSettings {
    /// Results per page.
    #[serde(default = "default_page_size")]
    pub size: usize,
}

/// Top-level settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Search endpoint settings.
    #[serde(default)]
    pub elasticsearch: EndpointSettings,

    /// Result page settings.
    #[serde(default)]
    pub page: PageSettings,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "cv-transcriptions".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    20
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: default_index(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            size: default_page_size(),
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file, then apply environment
    /// overrides.
    ///
    /// A missing file is not an error; the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content).map_err(|e| {
                    Error::config(format!("Failed to parse {}: {e}", path.display()))
                })?
            }
            Some(path) => {
                log::debug!("Settings file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment variable overrides in place.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CVSEARCH_ES_URL") {
            self.elasticsearch.url = url;
        }
        if let Ok(index) = std::env::var("CVSEARCH_ES_INDEX") {
            self.elasticsearch.index = index;
        }
        if let Ok(timeout) = std::env::var("CVSEARCH_ES_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.elasticsearch.timeout_secs = secs,
                Err(_) => log::warn!("Ignoring non-numeric CVSEARCH_ES_TIMEOUT_SECS={timeout}"),
            }
        }
        if let Ok(size) = std::env::var("CVSEARCH_PAGE_SIZE") {
            match size.parse() {
                Ok(size) => self.page.size = size,
                Err(_) => log::warn!("Ignoring non-numeric CVSEARCH_PAGE_SIZE={size}"),
            }
        }
    }

    /// Check invariants that would otherwise fail deep inside a request.
    pub fn validate(&self) -> Result<()> {
        if self.elasticsearch.url.trim().is_empty() {
            return Err(Error::config("elasticsearch.url must not be empty"));
        }
        if !self.elasticsearch.url.starts_with("http://")
            && !self.elasticsearch.url.starts_with("https://")
        {
            return Err(Error::config(format!(
                "elasticsearch.url must start with http:// or https://, got '{}'",
                self.elasticsearch.url
            )));
        }
        if self.elasticsearch.index.trim().is_empty() {
            return Err(Error::config("elasticsearch.index must not be empty"));
        }
        if self.page.size == 0 {
            return Err(Error::config("page.size must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.elasticsearch.url, "http://localhost:9200");
        assert_eq!(settings.elasticsearch.index, "cv-transcriptions");
        assert_eq!(settings.elasticsearch.timeout_secs, 30);
        assert_eq!(settings.page.size, 20);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let settings = Settings::load(Some(Path::new("/nonexistent/cvsearch.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cvsearch.toml");
        std::fs::write(
            &path,
            r#"
[elasticsearch]
url = "http://search.internal:9200"
index = "cv-dev"

[page]
size = 10
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.elasticsearch.url, "http://search.internal:9200");
        assert_eq!(settings.elasticsearch.index, "cv-dev");
        // Unspecified keys fall back to defaults
        assert_eq!(settings.elasticsearch.timeout_secs, 30);
        assert_eq!(settings.page.size, 10);
    }

    #[test]
    fn test_partial_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cvsearch.toml");
        std::fs::write(&path, "[elasticsearch]\nindex = \"cv-staging\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.elasticsearch.index, "cv-staging");
        assert_eq!(settings.elasticsearch.url, "http://localhost:9200");
    }

    #[test]
    fn test_validate_rejects_empty_index() {
        let mut settings = Settings::default();
        settings.elasticsearch.index = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut settings = Settings::default();
        settings.elasticsearch.url = "localhost:9200".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut settings = Settings::default();
        settings.page.size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(settings, parsed);
    }
}
