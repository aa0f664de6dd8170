//! modhook key bindings
//!
//! Parses key combos, keeps an action-to-combo registry and turns raw
//! per-frame input into press and release events on a
//! [`modhook_events::EventBus`].
//!
//! # Flow
//!
//! 1. Mods declare defaults with [`KeybindDeclaration`] and `inventory::submit!`
//! 2. [`KeybindRegistry::from_discovered`] collects them; user overrides are
//!    applied with [`KeybindRegistry::apply_overrides`]
//! 3. A [`ComboRecognizer`] is attached to the bus and listens for [`InputTick`]
//! 4. Subscribers handle [`KeybindPressed`] / [`KeybindReleased`], usually
//!    through [`ActionHandlers`]
//!
//! ```
//! use std::sync::Arc;
//! use modhook_events::EventBus;
//! use modhook_keybinds::{ComboRecognizer, InputTick, Key, Keybind, KeybindRegistry};
//!
//! let mut registry = KeybindRegistry::new();
//! registry.register(Keybind::new("hud.hide", "F1", "hud", "Hide the HUD"))?;
//!
//! let bus = EventBus::new();
//! Arc::new(ComboRecognizer::new(&registry)).attach(&bus)?;
//! bus.call(&InputTick::new([Key::F(1)], []));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod actions;
pub mod declaration;
pub mod error;
pub mod events;
pub mod models;
pub mod recognizer;
pub mod registry;

pub use actions::ActionHandlers;
pub use declaration::{discovered_keybinds, KeybindDeclaration};
pub use error::{ParseError, RegistryError};
pub use events::{InputTick, KeybindPressed, KeybindReleased};
pub use models::{InputState, Key, KeyCombo, Keybind, Modifier};
pub use recognizer::{ComboRecognizer, ComboTransition};
pub use registry::KeybindRegistry;
