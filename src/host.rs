//! Startup wiring for one mod inside a host process

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use modhook_common::{init_logging, ModConfig};
use modhook_events::{DrawTick, EventBus, InitReport, Unloading, UpdateTick};
use modhook_keybinds::{ComboRecognizer, InputTick, KeybindRegistry};
use modhook_settings::SettingsStore;

use crate::error::Result;

/// A running mod: its bus, bindings and settings.
///
/// The host integration layer creates one at load time, calls
/// [`ModHost::frame`] from its frame callback and [`ModHost::shutdown`]
/// before unloading.
pub struct ModHost<S> {
    config: ModConfig,
    bus: Arc<EventBus>,
    keybinds: KeybindRegistry,
    recognizer: Arc<ComboRecognizer>,
    settings_store: SettingsStore,
    settings: S,
    init_report: InitReport,
    frame: u64,
}

impl<S> ModHost<S>
where
    S: Serialize + DeserializeOwned + Default,
{
    /// Start from a config file, using defaults when it does not exist
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = ModConfig::load_or_default(path)?;
        Self::start(config)
    }

    /// Bring the mod up.
    ///
    /// Installs logging, loads settings, builds the keybind registry from
    /// declarations plus config overrides, attaches the combo recognizer and
    /// runs discovery on a fresh bus.
    pub fn start(config: ModConfig) -> Result<Self> {
        config.validate()?;
        init_logging(&config.logging)?;

        let settings_store = SettingsStore::new(config.resolved_settings_path());
        let settings = settings_store.load_or_default()?;

        let mut keybinds = KeybindRegistry::from_discovered();
        let rejected = keybinds.apply_overrides(&config.keybind_overrides);
        if !rejected.is_empty() {
            warn!(
                rejected = rejected.len(),
                "Some keybind overrides were not applied"
            );
        }

        let bus = EventBus::shared();
        let recognizer = Arc::new(ComboRecognizer::new(&keybinds));
        Arc::clone(&recognizer).attach(&bus)?;
        let init_report = bus.initialise_all()?;

        info!(
            mod_name = %config.mod_name,
            subscribers = bus.len(),
            keybinds = keybinds.len(),
            failed_init = init_report.failed.len(),
            "Mod started"
        );

        Ok(Self {
            config,
            bus,
            keybinds,
            recognizer,
            settings_store,
            settings,
            init_report,
            frame: 0,
        })
    }

    pub fn config(&self) -> &ModConfig {
        &self.config
    }

    /// The mod's event bus
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn keybinds(&self) -> &KeybindRegistry {
        &self.keybinds
    }

    /// What discovery did at startup
    pub fn init_report(&self) -> &InitReport {
        &self.init_report
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    pub fn save_settings(&self) -> Result<()> {
        self.settings_store.save(&self.settings)?;
        Ok(())
    }

    /// Rebind an action and refresh the recognizer
    pub fn rebind(&mut self, action_id: &str, key: &str) -> Result<()> {
        self.keybinds.rebind(action_id, key)?;
        self.recognizer.rebuild(&self.keybinds);
        Ok(())
    }

    /// Run one frame: input, then update, then draw.
    ///
    /// Returns the frame number.
    pub fn frame(&mut self, delta: Duration, input: &InputTick) -> u64 {
        self.frame += 1;
        let frame = self.frame;

        self.bus.call(input);
        self.bus.call(&UpdateTick { frame, delta });
        self.bus.call(&DrawTick { frame });
        frame
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Raise [`Unloading`], save settings and empty the bus
    pub fn shutdown(self) -> Result<()> {
        let report = self.bus.call(&Unloading);
        debug!(
            delivered = report.delivered,
            failed = report.failed,
            "Unloading dispatched"
        );
        self.recognizer.detach(&self.bus);
        self.bus.clear();
        self.save_settings()?;
        info!(mod_name = %self.config.mod_name, frames = self.frame, "Mod stopped");
        Ok(())
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for ModHost<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModHost")
            .field("mod_name", &self.config.mod_name)
            .field("subscribers", &self.bus.len())
            .field("keybinds", &self.keybinds.len())
            .field("settings", &self.settings)
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Counter {
        launches: u32,
    }

    fn config_in(dir: &TempDir) -> ModConfig {
        ModConfig {
            mod_name: "counter".to_string(),
            settings_path: Some(dir.path().join("counter.txt")),
            ..ModConfig::default()
        }
    }

    #[test]
    fn test_start_with_missing_settings() {
        let dir = TempDir::new().unwrap();
        let host: ModHost<Counter> = ModHost::start(config_in(&dir)).unwrap();

        assert_eq!(host.settings(), &Counter::default());
        assert_eq!(host.frame_count(), 0);
        assert!(host.bus().is_initialised());
    }

    #[test]
    fn test_settings_saved_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let mut host: ModHost<Counter> = ModHost::start(config_in(&dir)).unwrap();
        host.settings_mut().launches = 3;
        host.shutdown().unwrap();

        let host: ModHost<Counter> = ModHost::start(config_in(&dir)).unwrap();
        assert_eq!(host.settings().launches, 3);
    }

    #[test]
    fn test_frames_counted() {
        let dir = TempDir::new().unwrap();
        let mut host: ModHost<Counter> = ModHost::start(config_in(&dir)).unwrap();
        let idle = InputTick::idle();

        host.frame(Duration::from_millis(16), &idle);
        assert_eq!(host.frame(Duration::from_millis(16), &idle), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ModConfig {
            mod_name: " ".to_string(),
            ..ModConfig::default()
        };
        assert!(ModHost::<Counter>::start(config).is_err());
    }
}
