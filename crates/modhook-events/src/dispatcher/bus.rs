//! The event bus: registration, deferred deregistration and dispatch

use std::any::TypeId;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::{
    dispatcher::isolation::run_isolated,
    error::Result,
    registry::{HandlerTable, SubscriberSet},
    types::{Deregistration, DispatchReport, Event, SubscriberKey},
};

/// Process-wide event registry, constructed and owned by the host
/// integration layer and passed to producers and handlers by reference.
///
/// Dispatch is synchronous. The bus is `Send + Sync` so it can sit in an
/// `Arc`, but it is designed for a single driving thread: the dispatching
/// flag is a re-entrancy guard, not a lock. No internal lock is held while a
/// handler runs, so handlers may freely call [`register`](Self::register),
/// [`deregister`](Self::deregister) and [`call`](Self::call) on the bus they
/// receive.
///
/// # Examples
///
/// ```
/// use modhook_events::{Event, EventBus, HandlerTable, SubscriberKey};
///
/// struct Tick {
///     frame: u64,
/// }
/// impl Event for Tick {}
///
/// struct FrameCounter;
///
/// let bus = EventBus::new();
/// bus.register(
///     SubscriberKey::of_type::<FrameCounter>(),
///     HandlerTable::new().on(|tick: &Tick, _bus| {
///         assert_eq!(tick.frame, 1);
///         Ok(())
///     }),
/// )?;
///
/// let report = bus.call(&Tick { frame: 1 });
/// assert_eq!(report.delivered, 1);
/// # Ok::<(), modhook_events::EventsError>(())
/// ```
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<SubscriberSet>,
    depth: AtomicUsize,
    pub(crate) initialised: AtomicBool,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bus behind an `Arc`
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a subscriber with its handler table.
    ///
    /// A subscriber registered while a cycle is running is not visited by
    /// that cycle.
    ///
    /// # Errors
    ///
    /// If `key` is already registered a warning is logged, the existing
    /// handler table is kept and [`EventsError::AlreadyRegistered`] is
    /// returned.
    ///
    /// [`EventsError::AlreadyRegistered`]: crate::EventsError::AlreadyRegistered
    pub fn register(&self, key: SubscriberKey, table: HandlerTable) -> Result<()> {
        if table.is_empty() {
            warn!(subscriber = %key, "Registering subscriber with no handlers");
        }
        let handled = table.len();

        let mut subscribers = self.subscribers.lock();
        match subscribers.insert(key.clone(), table) {
            Ok(()) => {
                debug!(
                    subscriber = %key,
                    handlers = handled,
                    total = subscribers.len(),
                    "Subscriber registered"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    subscriber = %key,
                    "Subscriber already registered; keeping existing handlers"
                );
                Err(e)
            }
        }
    }

    /// Remove a subscriber.
    ///
    /// While a dispatch cycle is active the removal is queued and applied
    /// once the outermost cycle ends; repeated requests for the same key
    /// collapse into one. Otherwise the subscriber is removed immediately.
    pub fn deregister(&self, key: &SubscriberKey) -> Deregistration {
        let mut subscribers = self.subscribers.lock();
        if !subscribers.contains(key) {
            debug!(subscriber = %key, "Deregister requested for unknown subscriber");
            return Deregistration::NotRegistered;
        }

        if self.is_dispatching() {
            if subscribers.queue_removal(key.clone()) {
                debug!(subscriber = %key, "Removal deferred until dispatch completes");
            }
            Deregistration::Deferred
        } else {
            subscribers.remove(key);
            debug!(
                subscriber = %key,
                total = subscribers.len(),
                "Subscriber deregistered"
            );
            Deregistration::Removed
        }
    }

    /// Deliver `event` to every subscriber with a handler for exactly `E`.
    ///
    /// Subscribers are visited in registration order. The set visited is
    /// fixed when the cycle starts. Handler errors and panics are logged and
    /// counted in the returned report; they never reach the caller.
    pub fn call<E: Event>(&self, event: &E) -> DispatchReport {
        let event_type = TypeId::of::<E>();
        let mut report = DispatchReport::new(event.name());

        let cycle = self.enter_cycle();
        let snapshot = self.subscribers.lock().snapshot();
        trace!(
            event = report.event,
            subscribers = snapshot.len(),
            depth = cycle.depth,
            "Dispatch cycle started"
        );

        for (key, table) in snapshot {
            let Some(handler) = table.handler_for(event_type) else {
                report.skipped += 1;
                continue;
            };

            match run_isolated(|| handler.invoke(event, self)) {
                Ok(()) => report.delivered += 1,
                Err(failure) => {
                    error!(
                        subscriber = %key,
                        event = report.event,
                        error = %failure,
                        "Event handler failed"
                    );
                    report.failed += 1;
                }
            }
        }

        drop(cycle);
        trace!(
            event = report.event,
            delivered = report.delivered,
            failed = report.failed,
            "Dispatch cycle finished"
        );
        report
    }

    /// Whether a dispatch cycle (or init pass) is running
    pub fn is_dispatching(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }

    /// Number of registered subscribers, including ones queued for removal
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Whether no subscribers are registered
    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: &SubscriberKey) -> bool {
        self.subscribers.lock().contains(key)
    }

    /// Whether `key` is registered with a handler for `E`
    pub fn handles<E: Event>(&self, key: &SubscriberKey) -> bool {
        self.subscribers
            .lock()
            .table(key)
            .is_some_and(|table| table.handles::<E>())
    }

    /// Registered subscribers in registration order
    pub fn subscribers(&self) -> Vec<SubscriberKey> {
        self.subscribers.lock().keys()
    }

    /// Subscribers queued for removal
    pub fn pending_removals(&self) -> Vec<SubscriberKey> {
        self.subscribers.lock().pending().to_vec()
    }

    /// Remove every subscriber (process teardown).
    ///
    /// Ignored with a warning while a cycle is running.
    pub fn clear(&self) {
        if self.is_dispatching() {
            warn!("Cannot clear event bus during dispatch");
            return;
        }
        let removed = std::mem::take(&mut *self.subscribers.lock());
        debug!(removed = removed.len(), "Event bus cleared");
    }

    /// Mark a cycle active; the returned guard ends it on drop
    pub(crate) fn enter_cycle(&self) -> CycleGuard<'_> {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst);
        if depth == 0 {
            self.flush_removals();
        }
        CycleGuard {
            bus: self,
            depth: depth + 1,
        }
    }

    pub(crate) fn flush_removals(&self) -> usize {
        let removed = self.subscribers.lock().flush_pending();
        for key in &removed {
            debug!(subscriber = %key, "Deferred removal applied");
        }
        removed.len()
    }
}

/// An active dispatch cycle
pub(crate) struct CycleGuard<'a> {
    bus: &'a EventBus,
    pub(crate) depth: usize,
}

impl CycleGuard<'_> {
    /// Leave the cycle, returning how many deferred removals were applied.
    ///
    /// Zero when this was a nested cycle.
    pub(crate) fn finish(self) -> usize {
        let guard = std::mem::ManuallyDrop::new(self);
        guard.leave()
    }

    fn leave(&self) -> usize {
        if self.bus.depth.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.bus.flush_removals()
        } else {
            0
        }
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.leave();
    }
}
