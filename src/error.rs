use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Corpus load failed for '{path}': {detail}")]
    CorpusLoad { path: PathBuf, detail: String },

    #[error("Source error: {message}")]
    Source { message: String },
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
