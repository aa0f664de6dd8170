//! Per-subscriber handler tables

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::EventBus;
use crate::types::Event;

/// Return type of every event handler
pub type HandlerResult = anyhow::Result<()>;

type ErasedFn = dyn Fn(&dyn Any, &EventBus) -> HandlerResult + Send + Sync;

/// A handler with its event type erased
#[derive(Clone)]
pub struct ErasedHandler {
    event_name: &'static str,
    func: Arc<ErasedFn>,
}

impl ErasedHandler {
    fn new<E, F>(handler: F) -> Self
    where
        E: Event,
        F: Fn(&E, &EventBus) -> HandlerResult + Send + Sync + 'static,
    {
        let func = move |event: &dyn Any, bus: &EventBus| match event.downcast_ref::<E>() {
            Some(event) => handler(event, bus),
            None => Err(anyhow::anyhow!(
                "Handler for {} received an event of another type",
                type_name::<E>()
            )),
        };
        Self {
            event_name: type_name::<E>(),
            func: Arc::new(func),
        }
    }

    /// Name of the event type this handler accepts
    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    /// Invoke the handler
    pub fn invoke(&self, event: &dyn Any, bus: &EventBus) -> HandlerResult {
        (self.func)(event, bus)
    }
}

impl fmt::Debug for ErasedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedHandler")
            .field("event", &self.event_name)
            .finish()
    }
}

/// A subscriber's handlers, at most one per event type.
///
/// # Examples
///
/// ```
/// use modhook_events::{Event, HandlerTable};
///
/// struct Tick;
/// impl Event for Tick {}
///
/// let table = HandlerTable::new().on(|_tick: &Tick, _bus| Ok(()));
/// assert!(table.handles::<Tick>());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<TypeId, ErasedHandler>,
}

impl HandlerTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler for `E`, builder style
    pub fn on<E, F>(mut self, handler: F) -> Self
    where
        E: Event,
        F: Fn(&E, &EventBus) -> HandlerResult + Send + Sync + 'static,
    {
        self.insert(handler);
        self
    }

    /// Bind a handler for `E`.
    ///
    /// Returns `true` if an earlier handler for `E` was replaced.
    pub fn insert<E, F>(&mut self, handler: F) -> bool
    where
        E: Event,
        F: Fn(&E, &EventBus) -> HandlerResult + Send + Sync + 'static,
    {
        let replaced = self
            .handlers
            .insert(TypeId::of::<E>(), ErasedHandler::new(handler))
            .is_some();
        if replaced {
            debug!(event = type_name::<E>(), "Replaced handler in table");
        }
        replaced
    }

    /// Handler bound to exactly this event type
    pub fn handler_for(&self, event_type: TypeId) -> Option<&ErasedHandler> {
        self.handlers.get(&event_type)
    }

    /// Whether a handler is bound for `E`
    pub fn handles<E: Event>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<E>())
    }

    /// Names of the handled event types, sorted
    pub fn event_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.values().map(|h| h.event_name()).collect();
        names.sort_unstable();
        names
    }

    /// Number of bound handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are bound
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
