//! Statically declared default keybinds
//!
//! Mods declare their default bindings next to the code that handles them:
//!
//! ```rust,ignore
//! inventory::submit! {
//!     modhook_keybinds::KeybindDeclaration::new(
//!         "camera.toggle", "Alt+C", "camera", "Toggle the free camera",
//!     )
//! }
//! ```

use crate::models::Keybind;

/// A default keybind collected at link time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeybindDeclaration {
    pub action_id: &'static str,
    pub default_key: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

impl KeybindDeclaration {
    pub const fn new(
        action_id: &'static str,
        default_key: &'static str,
        category: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            action_id,
            default_key,
            category,
            description,
        }
    }

    /// Owned default keybind for this declaration
    pub fn to_keybind(&self) -> Keybind {
        Keybind::new_default(
            self.action_id,
            self.default_key,
            self.category,
            self.description,
        )
    }
}

inventory::collect!(KeybindDeclaration);

/// Discovered declarations, sorted by action id
pub fn discovered_keybinds() -> Vec<&'static KeybindDeclaration> {
    let mut declarations: Vec<_> = inventory::iter::<KeybindDeclaration>().collect();
    declarations.sort_by_key(|d| d.action_id);
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;

    inventory::submit! {
        KeybindDeclaration::new("test.declared", "Ctrl+Shift+F12", "test", "Declared in tests")
    }

    #[test]
    fn test_declaration_is_discovered() {
        let found = discovered_keybinds()
            .into_iter()
            .find(|d| d.action_id == "test.declared")
            .copied();
        assert_eq!(
            found,
            Some(KeybindDeclaration::new(
                "test.declared",
                "Ctrl+Shift+F12",
                "test",
                "Declared in tests"
            ))
        );
    }

    #[test]
    fn test_to_keybind_is_default() {
        let kb = KeybindDeclaration::new("hud.hide", "F1", "hud", "Hide HUD").to_keybind();
        assert!(kb.is_default);
        assert_eq!(kb.key, "F1");
        assert_eq!(kb.category, "hud");
    }

    #[test]
    fn test_discovered_sorted() {
        let ids: Vec<_> = discovered_keybinds().iter().map(|d| d.action_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
