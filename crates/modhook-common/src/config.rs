//! Runtime configuration for the mod
//!
//! The configuration is a small YAML document read once when the host loads
//! the mod:
//!
//! ```yaml
//! mod_name: "freecam"
//! logging:
//!   level: debug
//!   file: "logs/freecam.log"
//! settings_path: "freecam.settings"
//! keybind_overrides:
//!   camera.toggle: "Ctrl+F"
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::logging::LogLevel;

/// Logging section of [`ModConfig`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level, unless overridden by `MODHOOK_LOG`
    pub level: LogLevel,
    /// Log file; stderr when absent
    pub file: Option<PathBuf>,
}

/// Top-level mod configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModConfig {
    /// Name used for the default config and settings locations
    pub mod_name: String,

    /// Logging options
    pub logging: LoggingConfig,

    /// Settings file; `<config dir>/<mod_name>/settings.txt` when absent
    pub settings_path: Option<PathBuf>,

    /// Action id to key combo string, applied over declared defaults
    pub keybind_overrides: BTreeMap<String, String>,
}

impl Default for ModConfig {
    fn default() -> Self {
        Self {
            mod_name: "modhook".to_string(),
            logging: LoggingConfig::default(),
            settings_path: None,
            keybind_overrides: BTreeMap::new(),
        }
    }
}

impl ModConfig {
    /// Default configuration path for a mod name
    pub fn default_path(mod_name: &str) -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(mod_name)
            .join("config.yaml")
    }

    /// Parse configuration from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ModConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Check field values
    pub fn validate(&self) -> Result<()> {
        if self.mod_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "mod_name must not be empty".to_string(),
            ));
        }
        if let Some((action, _)) = self
            .keybind_overrides
            .iter()
            .find(|(action, combo)| action.is_empty() || combo.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "Keybind override for '{}' is incomplete",
                action
            )));
        }
        Ok(())
    }

    /// Resolved settings file location
    pub fn resolved_settings_path(&self) -> PathBuf {
        self.settings_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(&self.mod_name)
                .join("settings.txt")
        })
    }
}
