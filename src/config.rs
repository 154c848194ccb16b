use crate::error::{AggregatorError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Behavior when the on-disk corpus cannot be read at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OnCorpusError {
    /// Fail the run and surface the load error.
    #[default]
    Abort,
    /// Log the failure and continue with an empty corpus.
    StartEmpty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aggregator: AggregatorConfig,
    pub dedup: DedupConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Directory holding per-source corpus files and fixtures.
    pub data_dir: PathBuf,
    /// Sources to run when the CLI names none, by friendly name.
    pub sources: Vec<String>,
    pub on_corpus_error: OnCorpusError,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum name similarity for the fuzzy duplicate stage.
    pub similarity_threshold: f64,
    /// Maximum calendar-day gap between start dates for fuzzy comparison.
    pub max_day_gap: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_wait_secs: u64,
    pub max_wait_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            dedup: DedupConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sources: crate::constants::get_supported_sources()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            on_corpus_error: OnCorpusError::Abort,
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            max_day_gap: 1,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_wait_secs: 2,
            max_wait_secs: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            AggregatorError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Loads `config.toml` when present, otherwise falls back to defaults.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                Config::default()
            }
        }
    }
}
