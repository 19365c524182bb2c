//! Retention Log
//!
//! File sink with size- and age-bounded retention.

use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::{LogLevel, DEFAULT_MAX_AGE_HOURS, DEFAULT_MAX_SIZE_MB};
use crate::error::LogError;

// == Log Config ==
/// Destination and retention thresholds of a [`RetentionLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Backing log file
    pub path: PathBuf,
    /// File is deleted once its modification time is older than this
    pub max_age: Duration,
    /// File is deleted once it is larger than this
    pub max_size_bytes: u64,
    /// Lines below this level are discarded
    pub min_level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/app.log"),
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_HOURS * 3600),
            max_size_bytes: DEFAULT_MAX_SIZE_MB * 1024 * 1024,
            min_level: LogLevel::Info,
        }
    }
}

// == Retention Log ==
/// Append-only log sink with inline retention.
///
/// Every write first checks the backing file: if it is older than
/// `max_age` or larger than `max_size_bytes` it is deleted and the write
/// recreates it. Prior content is lost when that happens.
///
/// Failures never reach callers of the convenience methods; they are only
/// counted (see [`RetentionLog::failures`]).
#[derive(Debug)]
pub struct RetentionLog {
    config: LogConfig,
    /// Serializes check + append so two writers cannot interleave a delete
    /// with an append
    write_lock: Mutex<()>,
    failures: AtomicU64,
}

impl RetentionLog {
    // == Constructor ==
    /// Creates a log sink. Nothing touches the filesystem until the first write.
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
            failures: AtomicU64::new(0),
        }
    }

    /// Backing log file.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Number of failed retention checks and writes so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    // == Write ==
    /// Appends one `<timestamp> <LEVEL>: <message>` line.
    ///
    /// A failed retention check does not stop the append; the first error
    /// encountered is returned. Callers are free to ignore the result.
    pub fn write(&self, level: LogLevel, message: &str) -> Result<(), LogError> {
        if level < self.config.min_level {
            return Ok(());
        }

        mirror(level, message);

        let _guard = self.write_lock.lock();

        let retention = self.enforce_retention().map(|_| ());
        if retention.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }

        let line = format_line(level, message, Local::now());
        if let Err(source) = self.append(&line) {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(LogError::Write {
                path: self.config.path.clone(),
                source,
            });
        }

        retention
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        let _ = self.write(LogLevel::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let _ = self.write(LogLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let _ = self.write(LogLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        let _ = self.write(LogLevel::Error, message.as_ref());
    }

    // == Retention Check ==
    /// Deletes the backing file if it exceeds the age or size threshold.
    ///
    /// Returns `Ok(true)` when the file was deleted.
    pub fn enforce_retention(&self) -> Result<bool, LogError> {
        let path = &self.config.path;
        let retention_err = |source| LogError::Retention {
            path: path.clone(),
            source,
        };

        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(retention_err(e)),
        };

        // A modification time in the future counts as age zero
        let age = meta
            .modified()
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .unwrap_or(Duration::ZERO);

        if age > self.config.max_age || meta.len() > self.config.max_size_bytes {
            match fs::remove_file(path) {
                Ok(()) => Ok(true),
                // Someone else already removed it
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
                Err(e) => Err(retention_err(e)),
            }
        } else {
            Ok(false)
        }
    }

    fn append(&self, line: &str) -> io::Result<()> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)?;
        file.write_all(line.as_bytes())
    }
}

impl Default for RetentionLog {
    fn default() -> Self {
        Self::new(LogConfig::default())
    }
}

// == Utility Functions ==
/// Renders one log line, newline included.
///
/// CR and LF inside `message` are escaped so one event is always one line.
pub fn format_line(level: LogLevel, message: &str, now: DateTime<Local>) -> String {
    format!(
        "{} {}: {}\n",
        now.format("%Y-%m-%d %H:%M:%S,%3f"),
        level.as_str(),
        escape_line_breaks(message)
    )
}

fn escape_line_breaks(message: &str) -> Cow<'_, str> {
    if message.contains(['\r', '\n']) {
        Cow::Owned(message.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(message)
    }
}

fn mirror(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug!(target: "query_cache::log", "{}", message),
        LogLevel::Info => info!(target: "query_cache::log", "{}", message),
        LogLevel::Warn => warn!(target: "query_cache::log", "{}", message),
        LogLevel::Error => error!(target: "query_cache::log", "{}", message),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs::File;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> RetentionLog {
        RetentionLog::new(LogConfig {
            path: dir.path().join("logs").join("app.log"),
            ..LogConfig::default()
        })
    }

    #[test]
    fn test_format_line() {
        let now = Local.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let line = format_line(LogLevel::Info, "Running query", now);
        assert_eq!(line, "2025-03-01 10:00:00,000 INFO: Running query\n");
    }

    #[test]
    fn test_format_line_escapes_line_breaks() {
        let now = Local.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let line = format_line(LogLevel::Info, "line one\r\nERROR: forged", now);
        assert_eq!(
            line,
            "2025-03-01 10:00:00,000 INFO: line one\\r\\nERROR: forged\n"
        );
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_write_creates_parent_and_appends() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.info("first");
        log.error("second");

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" INFO: first"));
        assert!(lines[1].ends_with(" ERROR: second"));
        assert_eq!(log.failures(), 0);
    }

    #[test]
    fn test_below_min_level_is_discarded() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.debug("not recorded");

        assert!(!log.path().exists());
    }

    #[test]
    fn test_oversized_file_is_reset() {
        let dir = TempDir::new().unwrap();
        let log = RetentionLog::new(LogConfig {
            path: dir.path().join("app.log"),
            max_size_bytes: 64,
            ..LogConfig::default()
        });

        fs::write(log.path(), "x".repeat(65)).unwrap();
        log.info("fresh");

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(!content.contains("xxx"));
        assert!(content.ends_with(" INFO: fresh\n"));
    }

    #[test]
    fn test_file_at_threshold_is_kept() {
        let dir = TempDir::new().unwrap();
        let log = RetentionLog::new(LogConfig {
            path: dir.path().join("app.log"),
            max_size_bytes: 64,
            ..LogConfig::default()
        });

        fs::write(log.path(), "x".repeat(64)).unwrap();
        assert!(!log.enforce_retention().unwrap());
        assert!(log.path().exists());
    }

    #[test]
    fn test_retention_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        assert!(!log.enforce_retention().unwrap());
    }

    #[test]
    fn test_write_failure_is_counted_not_raised() {
        let dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so the append cannot succeed
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let log = RetentionLog::new(LogConfig {
            path: blocker.join("app.log"),
            ..LogConfig::default()
        });

        log.info("lost");
        let after_first = log.failures();
        assert!(after_first >= 1);
        assert!(matches!(
            log.write(LogLevel::Error, "lost again"),
            Err(LogError::Write { .. })
        ));
        assert!(log.failures() > after_first);
    }

    #[test]
    fn test_failed_delete_is_counted_not_raised() {
        let dir = TempDir::new().unwrap();
        // A stale directory sits where the log file should be; it cannot be
        // removed with remove_file
        let path = dir.path().join("app.log");
        fs::create_dir(&path).unwrap();
        File::open(&path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(6 * 3600))
            .unwrap();
        let log = RetentionLog::new(LogConfig {
            path: path.clone(),
            ..LogConfig::default()
        });

        assert!(matches!(
            log.enforce_retention(),
            Err(LogError::Retention { .. })
        ));

        log.info("still no panic");
        // One failed delete, one failed append
        assert_eq!(log.failures(), 2);
        assert!(path.is_dir());
    }
}
