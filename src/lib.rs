//! modhook
//!
//! In-process runtime for game mods: a typed event bus the host frame loop
//! drives, link-time subscriber discovery, key bindings that raise events,
//! and hand-editable settings.
//!
//! The member crates are re-exported under short names; [`ModHost`] wires
//! them together for the common case.
//!
//! ```no_run
//! use std::time::Duration;
//! use serde::{Deserialize, Serialize};
//! use modhook::{keybinds::InputTick, ModHost};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct FreeCam {
//!     speed: f32,
//! }
//!
//! let mut host: ModHost<FreeCam> = ModHost::from_config_file(
//!     &modhook::common::ModConfig::default_path("freecam"),
//! )?;
//! host.frame(Duration::from_millis(16), &InputTick::idle());
//! host.shutdown()?;
//! # Ok::<(), modhook::HostError>(())
//! ```

pub mod error;
pub mod host;

pub use error::{HostError, Result};
pub use host::ModHost;

pub use inventory;
pub use modhook_common as common;
pub use modhook_events as events;
pub use modhook_keybinds as keybinds;
pub use modhook_settings as settings;
