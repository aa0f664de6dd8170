//! Core data types for the event registry
//!
//! This module defines the event marker trait, subscriber identity and the
//! values returned by registry operations.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A value that can be dispatched through the [`EventBus`](crate::EventBus).
///
/// The concrete Rust type of the value is the dispatch key: a handler bound
/// to `E` only ever receives `E`, never a wrapper or a "parent" type.
/// Events are immutable by convention; handlers receive `&E`.
///
/// # Examples
///
/// ```
/// use modhook_events::Event;
///
/// struct PlayerSpawned {
///     pub player_id: u32,
/// }
///
/// impl Event for PlayerSpawned {}
/// ```
pub trait Event: Any + Send + Sync {
    /// Name used in log records
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Identity of a subscriber.
///
/// A subscriber is either a type (static subscription, one per type) or a
/// specific object instance (identity by reference). An instance key holds a
/// strong reference to its object, so the object outlives every key naming
/// it and its address cannot be reused by another object while the key is
/// registered. The `name` is carried for logging only and takes no part in
/// equality or hashing.
#[derive(Clone)]
pub enum SubscriberKey {
    /// Static subscription keyed by type
    Type { id: TypeId, name: &'static str },
    /// Instance subscription keyed by the address of a shared allocation
    Instance {
        id: TypeId,
        addr: usize,
        name: &'static str,
        anchor: Arc<dyn Any + Send + Sync>,
    },
}

impl SubscriberKey {
    /// Key for a static subscription by `T`
    pub fn of_type<T: ?Sized + 'static>() -> Self {
        SubscriberKey::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key for an instance subscription.
    ///
    /// Two keys are equal only when they point at the same allocation. The
    /// key keeps `instance` alive.
    pub fn of_instance<T: Send + Sync + 'static>(instance: &Arc<T>) -> Self {
        let anchor: Arc<dyn Any + Send + Sync> = Arc::clone(instance) as _;
        SubscriberKey::Instance {
            id: TypeId::of::<T>(),
            addr: Arc::as_ptr(instance) as usize,
            name: std::any::type_name::<T>(),
            anchor,
        }
    }

    /// Type name of the subscriber
    pub fn name(&self) -> &'static str {
        match self {
            SubscriberKey::Type { name, .. } | SubscriberKey::Instance { name, .. } => *name,
        }
    }

    /// Whether this key identifies an instance
    pub fn is_instance(&self) -> bool {
        matches!(self, SubscriberKey::Instance { .. })
    }
}

impl PartialEq for SubscriberKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SubscriberKey::Type { id: a, .. }, SubscriberKey::Type { id: b, .. }) => a == b,
            (
                SubscriberKey::Instance {
                    id: a, addr: a_addr, ..
                },
                SubscriberKey::Instance {
                    id: b, addr: b_addr, ..
                },
            ) => a == b && a_addr == b_addr,
            _ => false,
        }
    }
}

impl Eq for SubscriberKey {}

impl Hash for SubscriberKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            SubscriberKey::Type { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            SubscriberKey::Instance { id, addr, .. } => {
                1u8.hash(state);
                id.hash(state);
                addr.hash(state);
            }
        }
    }
}

impl fmt::Debug for SubscriberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for SubscriberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriberKey::Type { name, .. } => write!(f, "type:{}", name),
            SubscriberKey::Instance { name, addr, .. } => {
                write!(f, "instance:{}@{:#x}", name, addr)
            }
        }
    }
}

/// Outcome of [`EventBus::deregister`](crate::EventBus::deregister)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deregistration {
    /// The subscriber was removed immediately
    Removed,
    /// A dispatch cycle is active; the removal is applied when it ends
    Deferred,
    /// The key was not registered
    NotRegistered,
}

/// Summary of one dispatch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Name of the dispatched event
    pub event: &'static str,
    /// Handlers that ran to completion
    pub delivered: usize,
    /// Handlers that returned an error or panicked
    pub failed: usize,
    /// Subscribers with no handler for this event type
    pub skipped: usize,
}

impl DispatchReport {
    pub(crate) fn new(event: &'static str) -> Self {
        Self {
            event,
            delivered: 0,
            failed: 0,
            skipped: 0,
        }
    }

    /// Number of handlers that were invoked
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed
    }
}
