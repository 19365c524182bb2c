//! Query Cache - memoization of expensive query answers
//!
//! Two-tier cache (bounded LRU memory tier over a content-hashed disk tier)
//! with an operational log whose file is bounded by size and age.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod log;
pub mod models;

pub use api::AppState;
pub use cache::{CacheStats, HybridCache};
pub use config::Config;
pub use error::{CacheError, LogError, Result};
pub use handle::QueryCache;
pub use log::{LogConfig, LogLevel, RetentionLog};
