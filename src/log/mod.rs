//! Retention Log Module
//!
//! Append-only operational log whose backing file is deleted outright once
//! it grows too large or too old. The check runs inline before every write.

mod level;
mod retention;

pub use level::LogLevel;
pub use retention::{format_line, LogConfig, RetentionLog};

// == Public Constants ==
/// Default maximum age of the log file in hours
pub const DEFAULT_MAX_AGE_HOURS: u64 = 5;

/// Default maximum size of the log file in MiB
pub const DEFAULT_MAX_SIZE_MB: u64 = 10;
