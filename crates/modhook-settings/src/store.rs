//! Settings file on disk

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::format::{from_flat_text, to_flat_text};

/// File name used under the per-mod config directory
pub const SETTINGS_FILE: &str = "settings.txt";

/// Reads and writes one settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/<mod_name>/settings.txt`
    pub fn with_default_location(mod_name: &str) -> Self {
        let path = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(mod_name)
            .join(SETTINGS_FILE);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields `T::default()`
    pub fn load_or_default<T>(&self) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                debug!(path = %self.path.display(), "Loading settings");
                from_flat_text(&text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No settings file, using defaults");
                Ok(T::default())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read settings");
                Err(e.into())
            }
        }
    }

    /// Write settings, creating parent directories
    pub fn save<T: Serialize>(&self, settings: &T) -> Result<()> {
        let text = to_flat_text(settings)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}
