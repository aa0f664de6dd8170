//! Built-in event types
//!
//! Mods define most of their events themselves; these are the few every
//! subscriber can count on the host layer to raise.

pub mod frame;

pub use frame::{DrawTick, Unloading, UpdateTick};
