//! Error types for keybind operations

use thiserror::Error;

/// Errors that can occur while parsing key combos
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty key combination")]
    Empty,

    #[error("Invalid key syntax: {0}")]
    InvalidKeySyntax(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),
}

/// Errors that can occur in the keybind registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid action ID format: {0}")]
    InvalidActionIdFormat(String),

    #[error("Duplicate action ID: {0}")]
    DuplicateActionId(String),

    #[error("Key {key} already bound to {action}")]
    KeyConflict { key: String, action: String },

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Invalid key for {action}: {source}")]
    InvalidKey {
        action: String,
        #[source]
        source: ParseError,
    },
}
