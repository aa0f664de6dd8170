//! Event dispatch
//!
//! [`EventBus`] owns the subscriber set and delivers events to it. A dispatch
//! cycle moves the bus from idle to dispatching and back:
//!
//! ```text
//! Idle ──call()──► Dispatching ──last handler returns──► Idle
//!                     │  deregister() ─► queued
//!                     └─ nested call() ─► depth + 1
//! ```
//!
//! Removals queued while dispatching are applied when the outermost cycle
//! ends. Each handler runs in isolation: an error or panic is logged and the
//! remaining subscribers still receive the event.

pub mod bus;
pub mod isolation;

pub use bus::EventBus;
pub use isolation::{run_isolated, Failure};
