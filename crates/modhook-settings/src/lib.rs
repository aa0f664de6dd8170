//! modhook settings persistence
//!
//! User-facing mod settings stored as flat `key: value` text that players
//! can edit by hand. Any serde struct of scalar fields with a `Default`
//! works; missing or broken lines fall back to the default for that field.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use modhook_settings::SettingsStore;
//!
//! #[derive(Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct FreeCam {
//!     speed: f32,
//!     invert_y: bool,
//! }
//!
//! let store = SettingsStore::with_default_location("freecam");
//! let mut settings: FreeCam = store.load_or_default()?;
//! settings.speed = 2.0;
//! store.save(&settings)?;
//! # Ok::<(), modhook_settings::SettingsError>(())
//! ```

pub mod error;
pub mod format;
pub mod store;

pub use error::{Result, SettingsError};
pub use format::{from_flat_text, to_flat_text};
pub use store::{SettingsStore, SETTINGS_FILE};
