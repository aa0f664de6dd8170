//! Core data models for keybinds

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Represents a keyboard modifier (Ctrl, Shift, Alt, Meta)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "Ctrl"),
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Meta => write!(f, "Meta"),
        }
    }
}

impl FromStr for Modifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "shift" => Ok(Modifier::Shift),
            "alt" => Ok(Modifier::Alt),
            "meta" | "cmd" | "command" | "win" | "super" => Ok(Modifier::Meta),
            _ => Err(ParseError::InvalidModifier(s.to_string())),
        }
    }
}

/// Represents a key on the keyboard.
///
/// Character keys are stored lowercase; shifted characters are expressed
/// with the Shift modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    F(u8),
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Character key. ASCII letters are folded to lowercase; other
    /// characters are kept as given.
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char('+') => write!(f, "Plus"),
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::F(n) => write!(f, "F{}", n),
            Key::Space => write!(f, "Space"),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Insert => write!(f, "Insert"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PageUp"),
            Key::PageDown => write!(f, "PageDown"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
        }
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "" => Err(ParseError::Empty),
            "space" => Ok(Key::Space),
            "plus" => Ok(Key::Char('+')),
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "tab" => Ok(Key::Tab),
            "backspace" | "bksp" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "insert" | "ins" => Ok(Key::Insert),
            "home" => Ok(Key::Home),
            "end" => Ok(Key::End),
            "pageup" | "page_up" => Ok(Key::PageUp),
            "pagedown" | "page_down" => Ok(Key::PageDown),
            "up" => Ok(Key::Up),
            "down" => Ok(Key::Down),
            "left" => Ok(Key::Left),
            "right" => Ok(Key::Right),
            s if s.starts_with('f') && s.len() > 1 => {
                let num: u8 = s[1..].parse().map_err(|_| {
                    ParseError::InvalidKeySyntax(format!("Invalid function key: {}", s))
                })?;
                if (1..=12).contains(&num) {
                    Ok(Key::F(num))
                } else {
                    Err(ParseError::InvalidKeySyntax(format!(
                        "Function key must be F1-F12, got: {}",
                        s
                    )))
                }
            }
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Key::char(c)),
                    _ => Err(ParseError::InvalidKeySyntax(format!("Unknown key: {}", s))),
                }
            }
        }
    }
}

/// A key combination (modifiers + key).
///
/// Modifiers are kept sorted and deduplicated, so `Shift+Ctrl+S` and
/// `Ctrl+Shift+S` are the same combo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCombo {
    modifiers: Vec<Modifier>,
    key: Key,
}

impl KeyCombo {
    /// Create a combo, normalising the modifier list
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Key) -> Self {
        let mut modifiers: Vec<Modifier> = modifiers.into_iter().collect();
        modifiers.sort_unstable();
        modifiers.dedup();
        KeyCombo { modifiers, key }
    }

    /// Modifiers, sorted
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// The non-modifier key
    pub fn key(&self) -> Key {
        self.key
    }

    /// Whether the combo is held in `state`.
    ///
    /// The key must be down and the held modifiers must be exactly the
    /// combo's modifiers, so `S` does not fire while `Ctrl+S` is held.
    pub fn is_held(&self, state: &InputState) -> bool {
        state.keys.contains(&self.key)
            && state.modifiers.len() == self.modifiers.len()
            && self.modifiers.iter().all(|m| state.modifiers.contains(m))
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ParseError::InvalidKeySyntax(format!(
                "Empty segment in: {}",
                s
            )));
        }

        let (key_part, modifier_parts) = parts
            .split_last()
            .ok_or(ParseError::Empty)?;

        let modifiers = modifier_parts
            .iter()
            .map(|part| Modifier::from_str(part))
            .collect::<Result<Vec<_>, _>>()?;
        let key = Key::from_str(key_part)?;

        Ok(KeyCombo::new(modifiers, key))
    }
}

/// Keys and modifiers held during one input tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    keys: HashSet<Key>,
    modifiers: HashSet<Modifier>,
}

impl InputState {
    /// Build a state from held keys and modifiers
    pub fn new(
        keys: impl IntoIterator<Item = Key>,
        modifiers: impl IntoIterator<Item = Modifier>,
    ) -> Self {
        InputState {
            keys: keys.into_iter().collect(),
            modifiers: modifiers.into_iter().collect(),
        }
    }

    /// Whether nothing is held
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.modifiers.is_empty()
    }
}

/// A binding from an action to a key combo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybind {
    pub action_id: String,
    pub key: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Keybind {
    /// Create a new keybind
    pub fn new(
        action_id: impl Into<String>,
        key: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Keybind {
            action_id: action_id.into(),
            key: key.into(),
            category: category.into(),
            description: description.into(),
            is_default: false,
        }
    }

    /// Create a new default keybind
    pub fn new_default(
        action_id: impl Into<String>,
        key: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Keybind {
            is_default: true,
            ..Keybind::new(action_id, key, category, description)
        }
    }

    /// Parse the key string into a KeyCombo
    pub fn parse_key(&self) -> Result<KeyCombo, ParseError> {
        KeyCombo::from_str(&self.key)
    }
}
