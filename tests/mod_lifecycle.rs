//! A mod brought up from a config file, driven for a few frames and unloaded

use std::fs;
use std::time::Duration;

use modhook::events::{
    DrawTick, EventBus, HandlerTable, InitEntry, InitPhase, SubscriberDeclaration, SubscriberKey,
    Unloading, UpdateTick,
};
use modhook::keybinds::{ActionHandlers, InputTick, Key, KeybindDeclaration, Modifier};
use modhook::settings::SettingsStore;
use modhook::ModHost;
use parking_lot::{const_mutex, Mutex};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

static LOG: Mutex<Vec<String>> = const_mutex(Vec::new());

fn log(entry: impl Into<String>) {
    LOG.lock().push(entry.into());
}

fn take_log() -> Vec<String> {
    std::mem::take(&mut *LOG.lock())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct FreeCamSettings {
    speed: f32,
    invert_y: bool,
}

impl Default for FreeCamSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            invert_y: false,
        }
    }
}

struct FreeCamera;

modhook::inventory::submit! {
    KeybindDeclaration::new("freecam.toggle", "Alt+C", "camera", "Toggle the free camera")
}

modhook::inventory::submit! {
    SubscriberDeclaration::new("free_camera", free_camera_key, free_camera_handlers)
}

modhook::inventory::submit! {
    InitEntry::new("camera_pre", InitPhase::PreInit, camera_pre)
}

modhook::inventory::submit! {
    InitEntry::new("camera_post", InitPhase::PostInit, camera_post)
}

modhook::inventory::submit! {
    InitEntry::new("broken_init", InitPhase::PreInit, broken_init)
}

fn free_camera_key() -> SubscriberKey {
    SubscriberKey::of_type::<FreeCamera>()
}

fn free_camera_handlers() -> HandlerTable {
    ActionHandlers::new()
        .on_press("freecam.toggle", |_, _| {
            log("toggle");
            Ok(())
        })
        .into_table()
        .on(|tick: &UpdateTick, _: &EventBus| {
            log(format!("update {}", tick.frame));
            Ok(())
        })
        .on(|tick: &DrawTick, _: &EventBus| {
            log(format!("draw {}", tick.frame));
            Ok(())
        })
        .on(|_: &Unloading, _: &EventBus| {
            log("unloading");
            Ok(())
        })
}

fn camera_pre(bus: &EventBus) -> anyhow::Result<()> {
    log(format!("pre {}", bus.len()));
    Ok(())
}

fn camera_post(_bus: &EventBus) -> anyhow::Result<()> {
    log("post");
    Ok(())
}

fn broken_init(_bus: &EventBus) -> anyhow::Result<()> {
    anyhow::bail!("missing camera asset")
}

#[test]
fn mod_runs_from_config_to_unload() {
    let dir = TempDir::new().unwrap();
    let settings_path = dir.path().join("freecam").join("settings.txt");
    fs::create_dir_all(settings_path.parent().unwrap()).unwrap();
    fs::write(&settings_path, "# tuned by hand\nspeed: 2.5\nnot a setting\n").unwrap();

    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "mod_name: freecam\n\
             logging:\n  level: debug\n\
             settings_path: \"{}\"\n\
             keybind_overrides:\n  freecam.toggle: \"Ctrl+F\"\n  missing.action: \"F9\"\n",
            settings_path.display()
        ),
    )
    .unwrap();

    let mut host: ModHost<FreeCamSettings> = ModHost::from_config_file(&config_path).unwrap();

    // Startup
    assert_eq!(host.config().mod_name, "freecam");
    assert_eq!(host.settings().speed, 2.5);
    assert!(!host.settings().invert_y);
    assert_eq!(host.keybinds().lookup_by_action("freecam.toggle").unwrap().key, "Ctrl+F");

    let report = host.init_report();
    assert_eq!(report.registered, vec!["free_camera"]);
    assert_eq!(report.pre_init, vec!["camera_pre"]);
    assert_eq!(report.post_init, vec!["camera_post"]);
    assert_eq!(report.failed, vec!["broken_init"]);
    assert_eq!(take_log(), vec!["pre 2", "post"]);

    // Frames
    let delta = Duration::from_millis(16);
    host.frame(delta, &InputTick::new([Key::char('c')], [Modifier::Alt]));
    host.frame(delta, &InputTick::new([Key::char('f')], [Modifier::Ctrl]));
    host.frame(delta, &InputTick::new([Key::char('f')], [Modifier::Ctrl]));
    assert_eq!(
        take_log(),
        vec![
            "update 1", "draw 1", "toggle", "update 2", "draw 2", "update 3", "draw 3",
        ]
    );

    // Rebinding takes effect on the next frame
    host.rebind("freecam.toggle", "F5").unwrap();
    assert!(host.rebind("freecam.toggle", "Banana").is_err());
    assert_eq!(host.frame(delta, &InputTick::new([Key::F(5)], [])), 4);
    assert_eq!(take_log(), vec!["toggle", "update 4", "draw 4"]);

    // Unload
    host.settings_mut().invert_y = true;
    host.shutdown().unwrap();
    assert_eq!(take_log(), vec!["unloading"]);

    let saved: FreeCamSettings = SettingsStore::new(&settings_path).load_or_default().unwrap();
    assert_eq!(
        saved,
        FreeCamSettings {
            speed: 2.5,
            invert_y: true,
        }
    );
}
