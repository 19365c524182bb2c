//! Hybrid Cache Module
//!
//! Main cache engine combining the LRU memory tier with the disk tier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheStats, DiskTier, MemoryTier};
use crate::error::{CacheError, Result};
use crate::log::RetentionLog;

#[derive(Debug)]
struct CacheState {
    memory: MemoryTier,
    stats: CacheStats,
}

impl CacheState {
    fn insert(&mut self, key: &str, value: String) {
        if let Some(evicted) = self.memory.insert(key, value) {
            debug!(key = %evicted, "memory tier eviction");
            self.stats.record_eviction();
        }
        self.stats.set_size(self.memory.len());
    }
}

// == Hybrid Cache ==
/// Two-tier query result cache.
///
/// Lookups check memory first, then disk (promoting a disk hit into
/// memory). Writes go to both tiers. One mutex guards the memory tier and
/// the counters for the whole of each `get`/`put`, disk I/O included, so
/// recency order and the hit/miss pair are never torn.
#[derive(Debug)]
pub struct HybridCache {
    state: Mutex<CacheState>,
    disk: DiskTier,
    log: Arc<RetentionLog>,
}

impl HybridCache {
    // == Constructor ==
    /// Creates a cache whose memory tier holds at most `capacity` entries
    /// (0 is treated as 1) and whose disk tier lives in `cache_dir`.
    pub fn new(
        capacity: usize,
        cache_dir: impl Into<PathBuf>,
        log: Arc<RetentionLog>,
    ) -> Result<Self> {
        let disk = DiskTier::open(cache_dir)?;
        Ok(Self {
            state: Mutex::new(CacheState {
                memory: MemoryTier::new(capacity),
                stats: CacheStats::new(),
            }),
            disk,
            log,
        })
    }

    // == Put ==
    /// Stores `value` under `key` in both tiers.
    ///
    /// The memory tier is updated even when the disk write fails; the disk
    /// failure is then logged and returned.
    pub fn put(&self, key: &str, value: impl Into<String>) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("query cannot be empty".to_string()));
        }
        let value = value.into();

        let mut state = self.state.lock();
        let persisted = self.disk.write(key, &value);
        state.insert(key, value);
        drop(state);

        match persisted {
            Ok(path) => {
                debug!(path = %path.display(), "stored query result");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "disk tier write failed");
                self.log
                    .error(format!("Failed to persist result for query '{}': {}", key, e));
                Err(e)
            }
        }
    }

    // == Get ==
    /// Looks the key up in memory, then on disk.
    ///
    /// Unreadable, corrupt or colliding disk records count as misses.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock();

        if let Some(value) = state.memory.get(key) {
            state.stats.record_memory_hit();
            debug!("memory tier hit");
            return Some(value);
        }

        if key.is_empty() {
            state.stats.record_miss();
            return None;
        }

        match self.disk.read(key) {
            Ok(Some(record)) if record.query == key => {
                debug!("disk tier hit, promoting to memory");
                state.insert(key, record.result.clone());
                state.stats.record_disk_hit();
                Some(record.result)
            }
            Ok(Some(record)) => {
                state.stats.record_miss();
                drop(state);
                warn!(stored = %record.query, "disk tier hash collision");
                self.log.warn(format!(
                    "Hash collision for query '{}' (record belongs to '{}'), treating as miss",
                    key, record.query
                ));
                None
            }
            Ok(None) => {
                state.stats.record_miss();
                None
            }
            Err(e) => {
                state.stats.record_miss();
                drop(state);
                warn!(error = %e, "disk tier read failed");
                self.log
                    .error(format!("Failed to read cached result for query '{}': {}", key, e));
                None
            }
        }
    }

    // == Remove ==
    /// Removes the key from both tiers. Counters are left untouched.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut state = self.state.lock();
        let in_memory = state.memory.remove(key).is_some();
        let size = state.memory.len();
        state.stats.set_size(size);
        let on_disk = self.disk.remove(key)?;
        Ok(in_memory || on_disk)
    }

    // == Stats ==
    /// Snapshot of the counters, taken under the cache lock.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_size(state.memory.len());
        stats
    }

    // == Clear ==
    /// Empties the memory tier and resets all counters. Disk records stay.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.memory.clear();
        state.stats = CacheStats::new();
    }

    /// Whether the key is resident in memory. Does not affect recency or stats.
    pub fn contains_in_memory(&self, key: &str) -> bool {
        self.state.lock().memory.contains(key)
    }

    pub fn len(&self) -> usize {
        self.state.lock().memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().memory.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().memory.capacity()
    }

    pub fn cache_dir(&self) -> &Path {
        self.disk.dir()
    }

    /// Disk record file for `key`.
    pub fn disk_path(&self, key: &str) -> PathBuf {
        self.disk.path_for(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogConfig;
    use std::fs;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir, capacity: usize) -> HybridCache {
        let log = Arc::new(RetentionLog::new(LogConfig {
            path: dir.path().join("app.log"),
            ..LogConfig::default()
        }));
        HybridCache::new(capacity, dir.path().join("queries"), log).unwrap()
    }

    #[test]
    fn test_put_and_get() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.put("key1", "value1").unwrap();

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
        assert!(cache.disk_path("key1").exists());
    }

    #[test]
    fn test_get_nonexistent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        assert_eq!(cache.get("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        assert!(matches!(cache.put("", "v"), Err(CacheError::InvalidKey(_))));
        assert!(cache.is_empty());
        assert_eq!(cache.get(""), None);
    }

    #[test]
    fn test_overwrite() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.put("key1", "value1").unwrap();
        cache.put("key1", "value2").unwrap();

        assert_eq!(cache.get("key1"), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_eviction_recovers_from_disk() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 3);

        cache.put("key1", "value1").unwrap();
        cache.put("key2", "value2").unwrap();
        cache.put("key3", "value3").unwrap();
        // Cache is full, adding key4 should evict key1 (oldest)
        cache.put("key4", "value4").unwrap();

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_in_memory("key1"));

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert!(cache.contains_in_memory("key1"));
        // Promotion of key1 pushed out key2
        assert!(!cache.contains_in_memory("key2"));

        let stats = cache.stats();
        assert_eq!(stats.disk_hits, 1);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.size, 3);
    }

    #[test]
    fn test_lru_touch_on_get() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 2);

        cache.put("a", "1").unwrap();
        cache.put("b", "2").unwrap();
        cache.get("a");
        cache.put("c", "3").unwrap();

        assert!(cache.contains_in_memory("a"));
        assert!(!cache.contains_in_memory("b"));
        assert!(cache.contains_in_memory("c"));
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.put("key1", "value1").unwrap();
        cache.get("key1"); // hit
        cache.get("nonexistent"); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_clear_keeps_disk() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.put("key1", "value1").unwrap();
        cache.get("key1");
        cache.clear();

        assert_eq!(cache.stats(), CacheStats::default());
        assert!(!cache.contains_in_memory("key1"));

        // Memory miss, disk hit
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.stats().disk_hits, 1);
    }

    #[test]
    fn test_corrupt_disk_record_is_miss_and_logged() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        fs::write(cache.disk_path("q"), b"garbage").unwrap();

        assert_eq!(cache.get("q"), None);
        assert_eq!(cache.stats().misses, 1);
        let log = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(log.contains("ERROR: Failed to read cached result for query 'q'"));
    }

    #[test]
    fn test_hash_collision_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        // Plant another query's record under the hash of "q"
        let record = serde_json::json!({
            "query": "some other query",
            "result": "wrong answer",
            "stored_at": "2025-01-01T00:00:00Z"
        });
        fs::write(cache.disk_path("q"), record.to_string()).unwrap();

        assert_eq!(cache.get("q"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.put("key1", "value1").unwrap();
        assert!(cache.remove("key1").unwrap());
        assert!(!cache.remove("key1").unwrap());

        assert!(!cache.disk_path("key1").exists());
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_failed_persist_still_updates_memory() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        // Replace the record directory with a plain file
        fs::remove_dir_all(cache.cache_dir()).unwrap();
        fs::write(cache.cache_dir(), b"").unwrap();

        let result = cache.put("key1", "value1");
        assert!(matches!(result, Err(CacheError::Persistence { .. })));
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
    }
}
