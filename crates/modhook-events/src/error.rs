//! Error types for the event registry
//!
//! Registry operations never fail loudly: a rejected operation is logged and
//! the registry is left exactly as it was. The error value is still returned
//! so callers that care (tests, startup diagnostics) can react to it.
//!
//! Handler bodies do not use these types. They return `anyhow::Result<()>`
//! because their failures are heterogeneous and only ever logged.

use thiserror::Error;

/// Errors that can occur in the event registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventsError {
    /// The subscriber key is already present
    ///
    /// The existing handler table is kept. Deregister the key first to
    /// replace its handlers.
    #[error("Subscriber already registered: {0}")]
    AlreadyRegistered(String),

    /// `initialise_all` ran before on this bus
    #[error("Event bus already initialised")]
    AlreadyInitialised,
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, EventsError>;
