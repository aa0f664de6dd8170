//! Host startup and shutdown errors

use thiserror::Error;

use modhook_common::ConfigError;
use modhook_events::EventsError;
use modhook_keybinds::RegistryError;
use modhook_settings::SettingsError;

/// Host result type
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors raised while bringing a mod up or down
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Event bus error: {0}")]
    Events(#[from] EventsError),

    #[error("Keybind error: {0}")]
    Keybind(#[from] RegistryError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}
