//! Cache Module
//!
//! Two-tier query result cache: a bounded LRU memory tier over an
//! unbounded, content-hashed disk tier.

mod disk;
mod hybrid;
mod memory;
mod stats;


// Re-export public types
pub use disk::{hash_key, DiskRecord, DiskTier, RECORD_EXTENSION};
pub use hybrid::HybridCache;
pub use memory::MemoryTier;
pub use stats::CacheStats;

// == Public Constants ==
/// Default memory tier capacity
pub const DEFAULT_MEMORY_CAPACITY: usize = 100;
