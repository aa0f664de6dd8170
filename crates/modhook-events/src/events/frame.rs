//! Events raised by the host frame loop
//!
//! The host integration layer raises these from its update, draw and unload
//! callbacks. They carry only what every subscriber can rely on; anything
//! host-specific belongs in a mod's own event types.

use std::time::Duration;

use crate::types::Event;

/// Raised once per simulation update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTick {
    /// Monotonic frame counter
    pub frame: u64,
    /// Time since the previous update
    pub delta: Duration,
}

impl Event for UpdateTick {
    fn name(&self) -> &'static str {
        "update_tick"
    }
}

/// Raised once per rendered frame, after the update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTick {
    /// Frame counter of the update this draw follows
    pub frame: u64,
}

impl Event for DrawTick {
    fn name(&self) -> &'static str {
        "draw_tick"
    }
}

/// Raised once before the host unloads the mod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unloading;

impl Event for Unloading {
    fn name(&self) -> &'static str {
        "unloading"
    }
}
