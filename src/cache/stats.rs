//! Cache Statistics Module
//!
//! Tracks hits (split by tier), misses and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Counters of the hybrid cache. Reset only by `clear()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from either tier
    pub hits: u64,
    /// Lookups answered by neither tier
    pub misses: u64,
    /// Subset of `hits` that had to be read back from disk
    pub disk_hits: u64,
    /// Entries pushed out of the memory tier
    pub evictions: u64,
    /// Current memory tier occupancy
    pub size: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a hit that was promoted from disk.
    pub fn record_disk_hit(&mut self) {
        self.hits += 1;
        self.disk_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }
}
