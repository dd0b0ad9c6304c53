use std::io;

use thiserror::Error;

/// Errors raised while reading a run envelope or writing run outputs.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no input provided")]
    EmptyInput,

    #[error("model input has not been deserialized")]
    MissingInput,

    #[error("failed to configure logging: {0}")]
    Logging(String),
}
