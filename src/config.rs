//! Configuration Module
//!
//! Configuration value object handed to the cache at construction. Only the
//! binary loads it from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_MEMORY_CAPACITY;
use crate::log::{LogConfig, LogLevel, DEFAULT_MAX_AGE_HOURS, DEFAULT_MAX_SIZE_MB};

/// Cache and log configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries held by the memory tier
    pub memory_capacity: usize,
    /// Directory holding one record file per cached query
    pub cache_dir: PathBuf,
    /// Path of the retention-managed log file
    pub log_path: PathBuf,
    /// Log file is deleted once its last modification is older than this
    pub log_max_age_hours: u64,
    /// Log file is deleted once it grows beyond this many MiB
    pub log_max_size_mb: u64,
    /// Lines below this level are discarded
    pub log_level: LogLevel,
    /// HTTP server port (binary only)
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `QUERY_CACHE_CAPACITY` - Memory tier capacity (default: 100)
    /// - `QUERY_CACHE_DIR` - Disk tier directory (default: cache/queries)
    /// - `QUERY_LOG_FILE` - Log file path (default: logs/app.log)
    /// - `QUERY_LOG_MAX_AGE_HOURS` - Log max age (default: 5)
    /// - `QUERY_LOG_MAX_SIZE_MB` - Log max size (default: 10)
    /// - `QUERY_LOG_LEVEL` - debug, info, warning or error (default: info)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_capacity: parse_var("QUERY_CACHE_CAPACITY").unwrap_or(defaults.memory_capacity),
            cache_dir: env::var("QUERY_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            log_path: env::var("QUERY_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_path),
            log_max_age_hours: parse_var("QUERY_LOG_MAX_AGE_HOURS")
                .unwrap_or(defaults.log_max_age_hours),
            log_max_size_mb: parse_var("QUERY_LOG_MAX_SIZE_MB").unwrap_or(defaults.log_max_size_mb),
            log_level: parse_var("QUERY_LOG_LEVEL").unwrap_or(defaults.log_level),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Memory capacity clamped to at least one entry.
    pub fn effective_capacity(&self) -> usize {
        self.memory_capacity.max(1)
    }

    /// Projects the log-related fields.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            path: self.log_path.clone(),
            max_age: Duration::from_secs(self.log_max_age_hours.saturating_mul(3600)),
            max_size_bytes: self.log_max_size_mb.saturating_mul(1024 * 1024),
            min_level: self.log_level,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            cache_dir: PathBuf::from("cache/queries"),
            log_path: PathBuf::from("logs/app.log"),
            log_max_age_hours: DEFAULT_MAX_AGE_HOURS,
            log_max_size_mb: DEFAULT_MAX_SIZE_MB,
            log_level: LogLevel::Info,
            server_port: 3000,
        }
    }
}
