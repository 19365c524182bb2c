//! Disk Tier Module
//!
//! Unbounded durable store: one JSON record per query, named by the SHA-256
//! of the query string. Records are never evicted by the cache.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Extension of record files
pub const RECORD_EXTENSION: &str = "json";

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

// == Disk Record ==
/// Persisted form of one cache entry.
///
/// The original query is stored next to the result so a hash collision is
/// detected on read instead of returning another query's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskRecord {
    pub query: String,
    pub result: String,
    pub stored_at: DateTime<Utc>,
}

// == Disk Tier ==
#[derive(Debug, Clone)]
pub struct DiskTier {
    dir: PathBuf,
}

impl DiskTier {
    // == Constructor ==
    /// Opens (creating if needed) the record directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CacheError::persistence(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds (or would hold) the record for `query`.
    pub fn path_for(&self, query: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", hash_key(query), RECORD_EXTENSION))
    }

    // == Read ==
    /// Reads the record stored under the hash of `query`.
    ///
    /// Returns `Ok(None)` when no record exists. The caller checks
    /// `record.query` against the requested query.
    pub fn read(&self, query: &str) -> Result<Option<DiskRecord>> {
        let path = self.path_for(query);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::persistence(path, e)),
        };
        let record = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    // == Write ==
    /// Writes the record for `query`, replacing any previous one.
    ///
    /// The record is written to a temporary file in the same directory and
    /// renamed over the target, so readers see either the old or the new
    /// record, never a partial one.
    pub fn write(&self, query: &str, result: &str) -> Result<PathBuf> {
        let record = DiskRecord {
            query: query.to_string(),
            result: result.to_string(),
            stored_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&record)?;

        // Recreate the directory if it was removed underneath us
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::persistence(&self.dir, e))?;

        let path = self.path_for(query);
        let tmp = self.temp_path(query);
        if let Err(e) = fs::write(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(CacheError::persistence(tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(CacheError::persistence(path, e));
        }
        Ok(path)
    }

    // == Remove ==
    /// Deletes the record for `query`. Returns whether a record existed.
    pub fn remove(&self, query: &str) -> Result<bool> {
        let path = self.path_for(query);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::persistence(path, e)),
        }
    }

    fn temp_path(&self, query: &str) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{}.{}.{}.tmp",
            hash_key(query),
            std::process::id(),
            seq
        ))
    }
}

// == Utility Functions ==
/// Stable hex-encoded SHA-256 of the query string.
pub fn hash_key(query: &str) -> String {
    hex::encode(Sha256::digest(query.as_bytes()))
}
