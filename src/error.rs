// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OverlapError>;

#[derive(Error, Debug)]
pub enum OverlapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{engine} request failed: {message}")]
    Http { engine: String, message: String },

    #[error("{engine} response could not be parsed: {message}")]
    Parse { engine: String, message: String },

    #[error("Query argument error: {0}")]
    QueryArgument(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Taxonomy error in {path}: {message}")]
    Taxonomy { path: PathBuf, message: String },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl OverlapError {
    pub fn http(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            engine: engine.into(),
            message: message.into(),
        }
    }

    pub fn parse(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            engine: engine.into(),
            message: message.into(),
        }
    }
}
