//! Query Cache Handle
//!
//! Binds one retention log and one hybrid cache into the single resource the
//! query pipeline talks to.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::info;

use crate::cache::{CacheStats, HybridCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::log::RetentionLog;

/// Cache directories and log files owned by a live handle in this process.
static CLAIMED: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

// == Resource Claim ==
/// Exclusive claim on a filesystem resource, released on drop.
#[derive(Debug)]
struct ResourceClaim {
    path: PathBuf,
}

impl ResourceClaim {
    fn acquire(path: PathBuf) -> Result<Self> {
        let mut claimed = CLAIMED.lock();
        if !claimed.insert(path.clone()) {
            return Err(CacheError::ResourceInUse(path));
        }
        Ok(Self { path })
    }
}

impl Drop for ResourceClaim {
    fn drop(&mut self) {
        CLAIMED.lock().remove(&self.path);
    }
}

/// Absolute, symlink-resolved form of `path`, resolving as much of it as exists.
fn claim_key(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            claim_key(parent).join(name)
        }
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

// == Query Cache ==
/// Process-wide cache handle.
///
/// Construct one with [`QueryCache::open`] where the pipeline is wired up and
/// share it (typically as `Arc<QueryCache>`). While it is alive no second
/// handle in the process can open the same cache directory or log file.
#[derive(Debug)]
pub struct QueryCache {
    cache: HybridCache,
    log: Arc<RetentionLog>,
    // Dropped after `cache` and `log`
    _claims: [ResourceClaim; 2],
}

impl QueryCache {
    // == Constructor ==
    pub fn open(config: &Config) -> Result<Self> {
        let dir_claim = ResourceClaim::acquire(claim_key(&config.cache_dir))?;
        let log_claim = ResourceClaim::acquire(claim_key(&config.log_path))?;

        let log = Arc::new(RetentionLog::new(config.log_config()));
        let cache = HybridCache::new(
            config.effective_capacity(),
            config.cache_dir.clone(),
            Arc::clone(&log),
        )?;

        info!(
            capacity = cache.capacity(),
            cache_dir = %config.cache_dir.display(),
            log_path = %config.log_path.display(),
            "query cache opened"
        );

        Ok(Self {
            cache,
            log,
            _claims: [dir_claim, log_claim],
        })
    }

    // == Resolve ==
    /// Cached result for `query`, if either tier has it.
    pub fn resolve(&self, query: &str) -> Option<String> {
        self.cache.get(query)
    }

    // == Store ==
    /// Caches `result` for `query` in both tiers.
    pub fn store(&self, query: &str, result: impl Into<String>) -> Result<()> {
        self.cache.put(query, result)
    }

    // == Resolve Or Compute ==
    /// Returns the cached result, or runs `compute` and caches its output.
    ///
    /// Two callers that miss the same query at the same time will both run
    /// `compute` and both store; the later write wins on disk and in memory.
    /// A failure to persist is logged and otherwise ignored since the result
    /// is already held in memory.
    pub fn resolve_or_compute<F, E>(
        &self,
        query: &str,
        compute: F,
    ) -> std::result::Result<String, E>
    where
        F: FnOnce(&str) -> std::result::Result<String, E>,
    {
        if let Some(cached) = self.resolve(query) {
            return Ok(cached);
        }

        self.log.info(format!("Running computation for query: {}", query));
        let result = compute(query)?;

        if let Err(e) = self.store(query, result.clone()) {
            self.log
                .error(format!("Result for query '{}' not cached: {}", query, e));
        }
        Ok(result)
    }

    pub fn remove(&self, query: &str) -> Result<bool> {
        self.cache.remove(query)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Empties the memory tier and resets counters; disk records are kept.
    pub fn clear(&self) {
        self.cache.clear();
        self.log.info("Memory cache cleared");
    }

    pub fn cache(&self) -> &HybridCache {
        &self.cache
    }

    pub fn log(&self) -> &RetentionLog {
        &self.log
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log.debug(message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log.info(message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log.warn(message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log.error(message);
    }
}
