//! Memory Tier Module
//!
//! Bounded query -> result map with strict LRU eviction.

use std::collections::{HashMap, VecDeque};

// == Memory Tier ==
/// Bounded in-memory map ordered by recency.
///
/// Recency is kept in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// `len() <= capacity()` holds after every operation.
#[derive(Debug)]
pub struct MemoryTier {
    /// Query -> result storage
    entries: HashMap<String, String>,
    /// Keys by recency of touch
    order: VecDeque<String>,
    capacity: usize,
}

impl MemoryTier {
    // == Constructor ==
    /// Creates an empty tier. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    // == Get ==
    /// Returns the value and marks the key most recently used.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let value = self.entries.get(key)?.clone();
        self.touch(key);
        Some(value)
    }

    /// Returns the value without changing recency.
    #[cfg(test)]
    fn peek(&self, key: &str) -> Option<&String> {
        self.entries.get(key)
    }

    // == Insert ==
    /// Inserts or overwrites a value and marks the key most recently used.
    ///
    /// Inserting a new key into a full tier first evicts the least recently
    /// used key, which is returned.
    pub fn insert(&mut self, key: &str, value: String) -> Option<String> {
        if let Some(existing) = self.entries.get_mut(key) {
            *existing = value;
            self.touch(key);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        self.entries.insert(key.to_string(), value);
        self.order.push_front(key.to_string());
        evicted
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Key that would be evicted next.
    #[cfg(test)]
    fn oldest(&self) -> Option<&str> {
        self.order.back().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn touch(&mut self, key: &str) {
        if self.order.front().map(String::as_str) == Some(key) {
            return;
        }
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_front(k);
            }
        }
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.order.pop_back()?;
        self.entries.remove(&key);
        Some(key)
    }
}
