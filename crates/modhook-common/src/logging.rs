//! Logging initialisation for the mod runtime
//!
//! All modhook crates log through `tracing` macros. The host integration layer
//! calls [`init_logging`] once at load time to install a `tracing-subscriber`
//! fmt subscriber. The minimum level comes from [`LoggingConfig`] unless the
//! `MODHOOK_LOG` environment variable holds an `EnvFilter` directive, in which
//! case that wins.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{ConfigError, Result};

/// Environment variable that overrides the configured filter
pub const LOG_ENV_VAR: &str = "MODHOOK_LOG";

/// Minimum log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::Validation(format!(
                "Unknown log level: {}",
                other
            ))),
        }
    }
}

/// Build the filter for a configuration, honouring [`LOG_ENV_VAR`]
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}

/// Install the global `tracing` subscriber.
///
/// Returns `Ok(true)` when this call installed the subscriber and `Ok(false)`
/// when one was already installed (the host may reload the mod without
/// restarting the process).
///
/// # Errors
///
/// Returns an error if the log file or its parent directory cannot be created.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_target(true);

    let installed = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    match installed {
        Ok(()) => {
            debug!(level = %config.level, file = ?config.file, "Logging initialised");
            Ok(true)
        }
        Err(e) => {
            debug!(error = %e, "Global subscriber already installed");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_init_logging_twice_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: LogLevel::Debug,
            file: Some(dir.path().join("logs").join("mod.log")),
        };

        let first = init_logging(&config).unwrap();
        let second = init_logging(&config).unwrap();

        // Another test in this binary may have won the race for the global slot
        assert!(!second);
        let _ = first;
        assert!(dir.path().join("logs").exists());
    }
}
