//! History Store
//!
//! Bounded, append-only log of classified events. Oldest events are evicted
//! first once the store is full.

use std::collections::VecDeque;

use parking_lot::RwLock;

use crate::models::ClassifiedEvent;

/// Default number of events retained
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug)]
pub struct HistoryStore {
    events: RwLock<VecDeque<ClassifiedEvent>>,
    capacity: usize,
}

impl HistoryStore {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an event, evicting the oldest when full.
    ///
    /// Eviction and insertion happen under one write guard, so readers never
    /// see more than `capacity` events.
    pub fn append(&self, event: ClassifiedEvent) {
        let mut events = self.events.write();
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Newest event, or the "awaiting data" placeholder when empty
    pub fn latest(&self) -> ClassifiedEvent {
        self.events
            .read()
            .back()
            .cloned()
            .unwrap_or_else(ClassifiedEvent::awaiting_data)
    }

    /// Snapshot of all events, oldest first
    pub fn all(&self) -> Vec<ClassifiedEvent> {
        self.events.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
