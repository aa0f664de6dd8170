//! Per-action handlers for keybind presses

use std::collections::HashMap;
use std::sync::Arc;

use modhook_events::{EventBus, HandlerTable};
use tracing::trace;

use crate::events::KeybindPressed;

type ActionFn = Arc<dyn Fn(&KeybindPressed, &EventBus) -> anyhow::Result<()> + Send + Sync>;

/// Builds one [`KeybindPressed`] handler that routes by action id.
///
/// ```
/// use modhook_keybinds::ActionHandlers;
///
/// let table = ActionHandlers::new()
///     .on_press("hud.hide", |_, _| Ok(()))
///     .into_table();
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Default)]
pub struct ActionHandlers {
    actions: HashMap<String, ActionFn>,
}

impl ActionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `handler` when `action_id` is pressed. A later handler for the
    /// same action replaces the earlier one.
    pub fn on_press<F>(mut self, action_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&KeybindPressed, &EventBus) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.actions.insert(action_id.into(), Arc::new(handler));
        self
    }

    /// Actions with a handler, sorted
    pub fn actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        actions.sort_unstable();
        actions
    }

    /// Handler table for registering on the bus
    pub fn into_table(self) -> HandlerTable {
        let actions = self.actions;
        HandlerTable::new().on(move |event: &KeybindPressed, bus: &EventBus| {
            match actions.get(&event.action_id) {
                Some(handler) => handler(event, bus),
                None => {
                    trace!(action = %event.action_id, "No handler for action");
                    Ok(())
                }
            }
        })
    }
}

impl std::fmt::Debug for ActionHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHandlers")
            .field("actions", &self.actions())
            .finish()
    }
}
