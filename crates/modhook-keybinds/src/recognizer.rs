//! Edge detection from raw input ticks to keybind events

use std::collections::BTreeSet;
use std::sync::Arc;

use modhook_events::{Deregistration, EventBus, HandlerTable, SubscriberKey};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{
    events::{InputTick, KeybindPressed, KeybindReleased},
    models::KeyCombo,
    registry::KeybindRegistry,
};

/// A change in whether a bound combo is held
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboTransition {
    Pressed { action_id: String, combo: KeyCombo },
    Released { action_id: String, combo: KeyCombo },
}

#[derive(Debug, Default)]
struct RecognizerState {
    bindings: Vec<(String, KeyCombo)>,
    active: BTreeSet<String>,
}

/// Turns per-frame input into press and release edges for bound combos.
///
/// A combo held across many ticks produces a single press and a single
/// release.
#[derive(Debug, Default)]
pub struct ComboRecognizer {
    state: Mutex<RecognizerState>,
}

impl ComboRecognizer {
    /// Create a recognizer for the registry's current bindings
    pub fn new(registry: &KeybindRegistry) -> Self {
        Self {
            state: Mutex::new(RecognizerState {
                bindings: registry.bindings(),
                active: BTreeSet::new(),
            }),
        }
    }

    /// Replace the bindings after the registry changed.
    ///
    /// Actions that are no longer bound, or whose combo changed, are
    /// dropped from the held set without a release edge.
    pub fn rebuild(&self, registry: &KeybindRegistry) {
        let bindings = registry.bindings();
        let mut state = self.state.lock();
        let previous = std::mem::take(&mut state.bindings);
        state.active.retain(|action| {
            let old = previous.iter().find(|(a, _)| a == action).map(|(_, c)| c);
            let new = bindings.iter().find(|(a, _)| a == action).map(|(_, c)| c);
            old.is_some() && old == new
        });
        debug!(bindings = bindings.len(), "Combo recognizer rebuilt");
        state.bindings = bindings;
    }

    /// Actions whose combo is currently held
    pub fn active(&self) -> Vec<String> {
        self.state.lock().active.iter().cloned().collect()
    }

    /// Compare `tick` with the previous one.
    ///
    /// Releases are listed before presses; each group is ordered by action
    /// id.
    pub fn process(&self, tick: &InputTick) -> Vec<ComboTransition> {
        let input = tick.state();
        let mut state = self.state.lock();
        let RecognizerState { bindings, active } = &mut *state;

        let mut released = Vec::new();
        let mut pressed = Vec::new();
        for (action_id, combo) in bindings.iter() {
            let held = combo.is_held(&input);
            let was_held = active.contains(action_id);
            if held && !was_held {
                active.insert(action_id.clone());
                pressed.push(ComboTransition::Pressed {
                    action_id: action_id.clone(),
                    combo: combo.clone(),
                });
            } else if !held && was_held {
                active.remove(action_id);
                released.push(ComboTransition::Released {
                    action_id: action_id.clone(),
                    combo: combo.clone(),
                });
            }
        }

        released.extend(pressed);
        released
    }

    /// Key this recognizer registers under
    pub fn subscriber_key(self: &Arc<Self>) -> SubscriberKey {
        SubscriberKey::of_instance(self)
    }

    /// Subscribe to [`InputTick`] on `bus`.
    ///
    /// Each tick's transitions are dispatched as [`KeybindPressed`] and
    /// [`KeybindReleased`] from inside the tick's handler, so they run as a
    /// nested cycle.
    pub fn attach(self: Arc<Self>, bus: &EventBus) -> modhook_events::Result<SubscriberKey> {
        let key = self.subscriber_key();
        let recognizer = Arc::clone(&self);
        let table = HandlerTable::new().on(move |tick: &InputTick, bus: &EventBus| {
            for transition in recognizer.process(tick) {
                match transition {
                    ComboTransition::Pressed { action_id, combo } => {
                        trace!(action = %action_id, key = %combo, "Keybind pressed");
                        bus.call(&KeybindPressed { action_id, combo });
                    }
                    ComboTransition::Released { action_id, combo } => {
                        trace!(action = %action_id, key = %combo, "Keybind released");
                        bus.call(&KeybindReleased { action_id, combo });
                    }
                }
            }
            Ok(())
        });
        bus.register(key.clone(), table)?;
        debug!(subscriber = %key, "Combo recognizer attached");
        Ok(key)
    }

    /// Stop listening on `bus`
    pub fn detach(self: &Arc<Self>, bus: &EventBus) -> Deregistration {
        bus.deregister(&self.subscriber_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Key, Keybind, Modifier};
    use parking_lot::Mutex as PlMutex;

    fn registry() -> KeybindRegistry {
        let mut registry = KeybindRegistry::new();
        registry
            .register(Keybind::new("camera.toggle", "Alt+C", "camera", ""))
            .unwrap();
        registry
            .register(Keybind::new("hud.hide", "F1", "hud", ""))
            .unwrap();
        registry
    }

    fn alt_c() -> InputTick {
        InputTick::new([Key::char('c')], [Modifier::Alt])
    }

    #[test]
    fn test_press_once_per_edge() {
        let recognizer = ComboRecognizer::new(&registry());

        let first = recognizer.process(&alt_c());
        assert_eq!(
            first,
            vec![ComboTransition::Pressed {
                action_id: "camera.toggle".to_string(),
                combo: "Alt+C".parse().unwrap(),
            }]
        );
        assert!(recognizer.process(&alt_c()).is_empty());
        assert_eq!(recognizer.active(), vec!["camera.toggle"]);
    }

    #[test]
    fn test_release_on_edge() {
        let recognizer = ComboRecognizer::new(&registry());
        recognizer.process(&alt_c());

        let released = recognizer.process(&InputTick::idle());
        assert!(matches!(
            released.as_slice(),
            [ComboTransition::Released { action_id, .. }] if action_id == "camera.toggle"
        ));
        assert!(recognizer.process(&InputTick::idle()).is_empty());
        assert!(recognizer.active().is_empty());
    }

    #[test]
    fn test_extra_modifier_releases() {
        let recognizer = ComboRecognizer::new(&registry());
        recognizer.process(&alt_c());

        let tick = InputTick::new([Key::char('c')], [Modifier::Alt, Modifier::Shift]);
        let transitions = recognizer.process(&tick);
        assert!(matches!(
            transitions.as_slice(),
            [ComboTransition::Released { .. }]
        ));
    }

    #[test]
    fn test_releases_listed_before_presses() {
        let recognizer = ComboRecognizer::new(&registry());
        recognizer.process(&alt_c());

        let transitions = recognizer.process(&InputTick::new([Key::F(1)], []));
        assert!(matches!(
            transitions.as_slice(),
            [ComboTransition::Released { .. }, ComboTransition::Pressed { .. }]
        ));
    }

    #[test]
    fn test_rebuild_drops_rebound_actions() {
        let mut registry = registry();
        let recognizer = ComboRecognizer::new(&registry);
        recognizer.process(&InputTick::new([Key::char('c'), Key::F(1)], []));
        assert_eq!(recognizer.active(), vec!["hud.hide"]);

        registry.rebind("hud.hide", "F2").unwrap();
        recognizer.rebuild(&registry);
        assert!(recognizer.active().is_empty());

        let transitions = recognizer.process(&InputTick::new([Key::F(2)], []));
        assert_eq!(transitions.len(), 1);
    }

    #[test]
    fn test_attach_emits_events() {
        let bus = EventBus::new();
        let recognizer = Arc::new(ComboRecognizer::new(&registry()));
        let key = Arc::clone(&recognizer).attach(&bus).unwrap();
        assert!(bus.contains(&key));

        struct Listener;
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let pressed = Arc::clone(&seen);
        let released = Arc::clone(&seen);
        bus.register(
            SubscriberKey::of_type::<Listener>(),
            HandlerTable::new()
                .on(move |e: &KeybindPressed, _| {
                    pressed.lock().push(format!("+{}", e.action_id));
                    Ok(())
                })
                .on(move |e: &KeybindReleased, _| {
                    released.lock().push(format!("-{}", e.action_id));
                    Ok(())
                }),
        )
        .unwrap();

        bus.call(&alt_c());
        bus.call(&alt_c());
        bus.call(&InputTick::idle());

        assert_eq!(*seen.lock(), vec!["+camera.toggle", "-camera.toggle"]);
    }

    #[test]
    fn test_attach_twice_rejected() {
        let bus = EventBus::new();
        let recognizer = Arc::new(ComboRecognizer::new(&registry()));
        Arc::clone(&recognizer).attach(&bus).unwrap();
        assert!(Arc::clone(&recognizer).attach(&bus).is_err());
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_detach_from_press_handler_is_deferred() {
        let bus = Arc::new(EventBus::new());
        let recognizer = Arc::new(ComboRecognizer::new(&registry()));
        let key = Arc::clone(&recognizer).attach(&bus).unwrap();

        struct Detacher;
        let outcome = Arc::new(PlMutex::new(None));
        let slot = Arc::clone(&outcome);
        let target = Arc::clone(&recognizer);
        bus.register(
            SubscriberKey::of_type::<Detacher>(),
            HandlerTable::new().on(move |_: &KeybindPressed, bus: &EventBus| {
                *slot.lock() = Some(target.detach(bus));
                Ok(())
            }),
        )
        .unwrap();

        bus.call(&alt_c());

        assert_eq!(*outcome.lock(), Some(Deregistration::Deferred));
        assert!(!bus.contains(&key));
        assert!(bus.pending_removals().is_empty());
    }
}
