//! Shared plumbing for modhook crates
//!
//! - [`logging`]: installs the process-wide `tracing` subscriber
//! - [`config`]: the YAML runtime configuration read at mod load

pub mod config;
pub mod error;
pub mod logging;

pub use config::{LoggingConfig, ModConfig};
pub use error::{ConfigError, Result};
pub use logging::{init_logging, LogLevel, LOG_ENV_VAR};
