//! Insertion-ordered subscriber set with a deferred removal buffer

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{EventsError, Result};
use crate::registry::HandlerTable;
use crate::types::SubscriberKey;

/// Subscribers in registration order.
///
/// Each key appears at most once and is stored together with its table.
/// Keys queued for removal stay registered (and visible to
/// [`len`](Self::len) and [`contains`](Self::contains)) until
/// [`flush_pending`](Self::flush_pending) applies them.
#[derive(Debug, Default)]
pub struct SubscriberSet {
    entries: Vec<(SubscriberKey, Arc<HandlerTable>)>,
    members: HashSet<SubscriberKey>,
    pending: Vec<SubscriberKey>,
}

impl SubscriberSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::AlreadyRegistered`] and leaves the existing
    /// table untouched if `key` is present.
    pub fn insert(&mut self, key: SubscriberKey, table: HandlerTable) -> Result<()> {
        if self.members.contains(&key) {
            return Err(EventsError::AlreadyRegistered(key.to_string()));
        }
        self.members.insert(key.clone());
        self.entries.push((key, Arc::new(table)));
        Ok(())
    }

    /// Remove a subscriber now. Returns whether it was present.
    pub fn remove(&mut self, key: &SubscriberKey) -> bool {
        if !self.members.remove(key) {
            return false;
        }
        self.entries.retain(|(k, _)| k != key);
        self.pending.retain(|k| k != key);
        true
    }

    /// Queue a removal. Returns `false` if the key was already queued.
    pub fn queue_removal(&mut self, key: SubscriberKey) -> bool {
        if self.pending.contains(&key) {
            return false;
        }
        self.pending.push(key);
        true
    }

    /// Apply queued removals, returning the keys actually removed
    pub fn flush_pending(&mut self) -> Vec<SubscriberKey> {
        let pending = std::mem::take(&mut self.pending);
        pending.into_iter().filter(|key| self.remove(key)).collect()
    }

    /// Subscribers and their tables in registration order
    pub fn snapshot(&self) -> Vec<(SubscriberKey, Arc<HandlerTable>)> {
        self.entries.clone()
    }

    /// Handler table of a subscriber
    pub fn table(&self, key: &SubscriberKey) -> Option<Arc<HandlerTable>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, table)| Arc::clone(table))
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: &SubscriberKey) -> bool {
        self.members.contains(key)
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> Vec<SubscriberKey> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Keys queued for removal
    pub fn pending(&self) -> &[SubscriberKey] {
        &self.pending
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no subscribers are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
