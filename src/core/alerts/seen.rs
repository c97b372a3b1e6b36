// Bounded recency cache of sighting keys that have already alerted.

use std::collections::{HashSet, VecDeque};

use crate::core::model::SightingKey;

/// How many alerted keys are remembered before the oldest is forgotten.
pub const SEEN_CAPACITY: usize = 100;

/// Insertion-ordered set, newest first, with FIFO eviction at capacity.
///
/// Membership is O(1) via the mirror set. Insertion is add-if-absent: a key
/// already present is neither re-inserted nor moved to the front, so its
/// eviction slot never improves.
#[derive(Debug)]
pub struct SeenCache {
    order: VecDeque<SightingKey>,
    members: HashSet<SightingKey>,
    capacity: usize,
}

impl SeenCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, key: &SightingKey) -> bool {
        self.members.contains(key)
    }

    /// Returns true if the key was newly added, false if already present.
    pub fn insert(&mut self, key: SightingKey) -> bool {
        if self.members.contains(&key) {
            return false;
        }
        self.members.insert(key.clone());
        self.order.push_front(key);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_back() {
                self.members.remove(&oldest);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
