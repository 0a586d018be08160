//! Bounded record of routes that have already been prefetched.

use std::collections::{HashMap, VecDeque};

/// Default number of routes remembered before the oldest is forgotten.
pub const DEFAULT_CAPACITY: usize = 256;

/// Identifies one insertion of a key. A key that is evicted and
/// inserted again gets a new mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(u64);

/// A set of route keys with insertion order and a size cap.
///
/// When full, inserting a new key evicts the oldest one. An evicted
/// route may be prefetched again later, which only costs a redundant
/// chunk load; the cap keeps a long-lived session from growing the set
/// without bound.
#[derive(Debug, Clone)]
pub struct PrefetchRegistry {
    capacity: usize,
    order: VecDeque<String>,
    members: HashMap<String, Mark>,
    next_mark: u64,
}

impl PrefetchRegistry {
    /// Creates an empty registry. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashMap::with_capacity(capacity),
            next_mark: 0,
        }
    }

    /// Records `key`. Returns `None` if it was already present.
    pub fn insert(&mut self, key: &str) -> Option<Mark> {
        if self.members.contains_key(key) {
            return None;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
                tracing::trace!(evicted = %oldest, "prefetch registry full");
            }
        }

        let mark = Mark(self.next_mark);
        self.next_mark += 1;
        self.order.push_back(key.to_string());
        self.members.insert(key.to_string(), mark);
        Some(mark)
    }

    /// Forgets `key`, but only if it still holds `mark`. A key that was
    /// evicted and recorded again by a later insert is left alone.
    pub fn release(&mut self, key: &str, mark: Mark) -> bool {
        if self.members.get(key) != Some(&mark) {
            return false;
        }
        self.members.remove(key);
        self.order.retain(|k| k != key);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

impl Default for PrefetchRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
