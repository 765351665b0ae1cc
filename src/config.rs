use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::LimitRange;
use crate::error::Result;

/// Top-level assistant configuration, read from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub service: ServiceConfig,
    pub suggest: SuggestConfig,
    pub dictionary: DictionaryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the autocomplete service.
    pub base_url: String,
    /// Interval of the statistics poll, in seconds. Zero disables it.
    pub stats_poll_secs: u64,
    /// Per-request timeout, in seconds. Zero means no timeout.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Initial rank limit `k`.
    pub limit: usize,
    pub min_limit: usize,
    pub max_limit: usize,
    /// Maximum number of spelling candidates shown.
    pub spell_limit: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Newline-separated word list for spell checking.
    pub path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            stats_poll_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            min_limit: 1,
            max_limit: 10,
            spell_limit: 3,
        }
    }
}

impl ServiceConfig {
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_poll_secs > 0).then(|| Duration::from_secs(self.stats_poll_secs))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl SuggestConfig {
    pub fn limit_range(&self) -> LimitRange {
        let min = self.min_limit.max(1);
        LimitRange {
            min,
            max: self.max_limit.max(min),
        }
    }
}

impl AssistConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Like `from_path`, but falls back to defaults when the file is
    /// missing or unparseable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config, {} not loaded: {e}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AssistConfig::from_toml(
            r#"
            [service]
            base_url = "http://127.0.0.1:9000"

            [suggest]
            limit = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.service.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.service.stats_poll_secs, 5);
        assert_eq!(config.service.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.suggest.limit, 8);
        assert_eq!(config.suggest.spell_limit, 3);
        assert!(config.dictionary.path.is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AssistConfig::from_toml("[suggest]\nlimit = \"many\"").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = AssistConfig::load_or_default("/nonexistent/typeahead.toml");
        assert_eq!(config.suggest.limit, 5);
    }

    #[test]
    fn test_limit_range_is_sane() {
        let suggest = SuggestConfig { min_limit: 0, max_limit: 0, ..Default::default() };
        assert_eq!(suggest.limit_range(), LimitRange { min: 1, max: 1 });
        let service = ServiceConfig {
            stats_poll_secs: 0,
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(service.stats_interval().is_none());
        assert!(service.request_timeout().is_none());
    }
}
