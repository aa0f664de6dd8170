//! modhook event dispatch
//!
//! A typed event registry for mods running inside a host game's frame loop.
//!
//! # Overview
//!
//! Subscribers register a table of handlers, one per event type. Producers
//! hand an event value to [`EventBus::call`], which delivers it to every
//! subscriber holding a handler for exactly that type, in registration order.
//!
//! # Architecture
//!
//! 1. **Types** (`types`): the [`Event`] trait and [`SubscriberKey`] identity
//! 2. **Registry** (`registry`): [`HandlerTable`] and the ordered [`SubscriberSet`]
//! 3. **Dispatcher** (`dispatcher`): [`EventBus`], dispatch cycles and failure isolation
//! 4. **Discovery** (`discovery`): link-time subscriber and init declarations
//! 5. **Events** (`events`): frame loop events raised by the host layer
//!
//! # Quick Start
//!
//! ```
//! use modhook_events::{EventBus, HandlerTable, SubscriberKey, UpdateTick};
//! use std::time::Duration;
//!
//! struct Speedometer;
//!
//! let bus = EventBus::new();
//! bus.register(
//!     SubscriberKey::of_type::<Speedometer>(),
//!     HandlerTable::new().on(|tick: &UpdateTick, _bus| {
//!         tracing::trace!(frame = tick.frame, "speedometer update");
//!         Ok(())
//!     }),
//! )?;
//!
//! bus.call(&UpdateTick { frame: 1, delta: Duration::from_millis(16) });
//! # Ok::<(), modhook_events::EventsError>(())
//! ```
//!
//! # Re-entrancy
//!
//! Handlers receive the bus and may register, deregister or dispatch from
//! inside a cycle. A deregistration requested during a cycle is deferred
//! until the outermost cycle ends, so the set of subscribers a cycle visits
//! never changes under it.
//!
//! # Error Handling
//!
//! Handlers return `anyhow::Result<()>`. An error or panic in one handler is
//! logged and counted in the [`DispatchReport`]; the other subscribers still
//! receive the event. Registry operations return [`Result`] with
//! [`EventsError`] but always leave the registry consistent.

pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod registry;
pub mod types;

// Re-export public types
pub use discovery::{
    list_discovered_init_entries, list_discovered_subscribers, InitEntry, InitPhase, InitReport,
    SubscriberDeclaration,
};
pub use dispatcher::{EventBus, Failure};
pub use error::{EventsError, Result};
pub use events::{DrawTick, Unloading, UpdateTick};
pub use registry::{HandlerResult, HandlerTable, SubscriberSet};
pub use types::{Deregistration, DispatchReport, Event, SubscriberKey};
