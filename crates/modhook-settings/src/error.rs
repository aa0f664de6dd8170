//! Settings error types

use thiserror::Error;

/// Settings result type
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings must be a flat struct of scalars: {0}")]
    NotFlat(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
