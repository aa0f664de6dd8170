//! Keybind registry with lookup in both directions

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::{
    declaration::{discovered_keybinds, KeybindDeclaration},
    error::RegistryError,
    models::{KeyCombo, Keybind},
};

/// Registry for storing and looking up keybinds.
///
/// Each action has exactly one combo and each combo triggers at most one
/// action.
#[derive(Debug, Clone, Default)]
pub struct KeybindRegistry {
    /// Map from action_id to keybind and its parsed combo
    by_action: BTreeMap<String, (Keybind, KeyCombo)>,
    /// Map from combo to action_id
    by_combo: HashMap<KeyCombo, String>,
}

impl KeybindRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from declarations.
    ///
    /// Declarations that fail to register are logged and skipped.
    pub fn from_declarations<'a>(
        declarations: impl IntoIterator<Item = &'a KeybindDeclaration>,
    ) -> Self {
        let mut registry = Self::new();
        for declaration in declarations {
            if let Err(e) = registry.register(declaration.to_keybind()) {
                warn!(
                    action = declaration.action_id,
                    error = %e,
                    "Skipping declared keybind"
                );
            }
        }
        registry
    }

    /// Build a registry from every discovered declaration
    pub fn from_discovered() -> Self {
        Self::from_declarations(discovered_keybinds())
    }

    /// Register a keybind
    pub fn register(&mut self, keybind: Keybind) -> Result<(), RegistryError> {
        if keybind.action_id.trim().is_empty() {
            return Err(RegistryError::InvalidActionIdFormat(
                "Action ID cannot be empty".to_string(),
            ));
        }
        if self.by_action.contains_key(&keybind.action_id) {
            return Err(RegistryError::DuplicateActionId(keybind.action_id));
        }

        let combo = keybind
            .parse_key()
            .map_err(|source| RegistryError::InvalidKey {
                action: keybind.action_id.clone(),
                source,
            })?;

        if let Some(existing) = self.by_combo.get(&combo) {
            return Err(RegistryError::KeyConflict {
                key: combo.to_string(),
                action: existing.clone(),
            });
        }

        debug!(action = %keybind.action_id, key = %combo, "Keybind registered");
        self.by_combo.insert(combo.clone(), keybind.action_id.clone());
        self.by_action
            .insert(keybind.action_id.clone(), (keybind, combo));
        Ok(())
    }

    /// Unregister a keybind by action ID
    pub fn unregister(&mut self, action_id: &str) -> Result<Keybind, RegistryError> {
        let (keybind, combo) = self
            .by_action
            .remove(action_id)
            .ok_or_else(|| RegistryError::ActionNotFound(action_id.to_string()))?;
        self.by_combo.remove(&combo);
        Ok(keybind)
    }

    /// Bind an existing action to a new combo.
    ///
    /// On error the previous binding is kept.
    pub fn rebind(&mut self, action_id: &str, key: &str) -> Result<(), RegistryError> {
        let (current, current_combo) = self
            .by_action
            .get(action_id)
            .cloned()
            .ok_or_else(|| RegistryError::ActionNotFound(action_id.to_string()))?;

        let combo = key.parse::<KeyCombo>().map_err(|source| RegistryError::InvalidKey {
            action: action_id.to_string(),
            source,
        })?;

        if combo == current_combo {
            return Ok(());
        }
        if let Some(existing) = self.by_combo.get(&combo) {
            return Err(RegistryError::KeyConflict {
                key: combo.to_string(),
                action: existing.clone(),
            });
        }

        self.by_combo.remove(&current_combo);
        self.by_combo.insert(combo.clone(), action_id.to_string());
        let keybind = Keybind {
            key: combo.to_string(),
            is_default: false,
            ..current
        };
        debug!(action = action_id, key = %combo, "Keybind rebound");
        self.by_action
            .insert(action_id.to_string(), (keybind, combo));
        Ok(())
    }

    /// Apply user overrides (action id to combo string).
    ///
    /// Each override is applied independently; failures are logged and
    /// returned, and leave that action's binding unchanged.
    pub fn apply_overrides<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Vec<RegistryError> {
        let mut failures = Vec::new();
        for (action_id, key) in overrides {
            if let Err(e) = self.rebind(action_id, key) {
                warn!(action = %action_id, key = %key, error = %e, "Keybind override rejected");
                failures.push(e);
            }
        }
        failures
    }

    /// Lookup keybind by action ID
    pub fn lookup_by_action(&self, action_id: &str) -> Option<&Keybind> {
        self.by_action.get(action_id).map(|(keybind, _)| keybind)
    }

    /// Lookup action ID by key combination
    pub fn lookup_by_combo(&self, combo: &KeyCombo) -> Option<&str> {
        self.by_combo.get(combo).map(String::as_str)
    }

    /// Action ids and combos, sorted by action id
    pub fn bindings(&self) -> Vec<(String, KeyCombo)> {
        self.by_action
            .iter()
            .map(|(action, (_, combo))| (action.clone(), combo.clone()))
            .collect()
    }

    /// Get all keybinds, sorted by action id
    pub fn all_keybinds(&self) -> Vec<&Keybind> {
        self.by_action.values().map(|(keybind, _)| keybind).collect()
    }

    /// Get all keybinds for a category
    pub fn keybinds_by_category(&self, category: &str) -> Vec<&Keybind> {
        self.all_keybinds()
            .into_iter()
            .filter(|kb| kb.category == category)
            .collect()
    }

    /// Get all unique categories
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .by_action
            .values()
            .map(|(kb, _)| kb.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Get number of registered keybinds
    pub fn len(&self) -> usize {
        self.by_action.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.by_action.is_empty()
    }

    /// Clear all keybinds
    pub fn clear(&mut self) {
        self.by_action.clear();
        self.by_combo.clear();
    }
}
