//! Input events carried on the bus

use modhook_events::Event;

use crate::models::{InputState, Key, KeyCombo, Modifier};

/// Raw input sampled once per frame by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTick {
    pub pressed: Vec<Key>,
    pub modifiers: Vec<Modifier>,
}

impl InputTick {
    pub fn new(
        pressed: impl IntoIterator<Item = Key>,
        modifiers: impl IntoIterator<Item = Modifier>,
    ) -> Self {
        Self {
            pressed: pressed.into_iter().collect(),
            modifiers: modifiers.into_iter().collect(),
        }
    }

    /// Tick with nothing held
    pub fn idle() -> Self {
        Self::default()
    }

    /// Held keys and modifiers as a set
    pub fn state(&self) -> InputState {
        InputState::new(self.pressed.iter().copied(), self.modifiers.iter().copied())
    }
}

impl Event for InputTick {
    fn name(&self) -> &'static str {
        "input_tick"
    }
}

/// A bound combo went down this tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindPressed {
    pub action_id: String,
    pub combo: KeyCombo,
}

impl Event for KeybindPressed {
    fn name(&self) -> &'static str {
        "keybind_pressed"
    }
}

/// A bound combo was released this tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindReleased {
    pub action_id: String,
    pub combo: KeyCombo,
}

impl Event for KeybindReleased {
    fn name(&self) -> &'static str {
        "keybind_released"
    }
}
