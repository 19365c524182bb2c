//! Response DTOs for the query cache service
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for GET /resolve
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    /// The requested query
    pub query: String,
    /// The cached result
    pub result: String,
}

impl ResolveResponse {
    pub fn new(query: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            result: result.into(),
        }
    }
}

/// Response body for PUT /store
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    /// Success message
    pub message: String,
    /// The query that was stored
    pub query: String,
}

impl StoreResponse {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            message: format!("Result for '{}' cached successfully", query),
            query,
        }
    }
}

/// Response body for DELETE /entry
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    pub message: String,
    pub query: String,
    /// Whether either tier held the query
    pub removed: bool,
}

impl RemoveResponse {
    pub fn new(query: impl Into<String>, removed: bool) -> Self {
        let query = query.into();
        let message = if removed {
            format!("Query '{}' removed", query)
        } else {
            format!("Query '{}' was not cached", query)
        };
        Self {
            message,
            query,
            removed,
        }
    }
}

/// Response body for POST /clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Memory cache cleared; disk records kept".to_string(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups answered from either tier
    pub hits: u64,
    /// Lookups answered by neither tier
    pub misses: u64,
    /// Hits served from disk
    pub disk_hits: u64,
    /// Memory tier evictions
    pub evictions: u64,
    /// Current memory tier occupancy
    pub size: usize,
    /// Memory tier capacity
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Failed log writes since startup
    pub log_failures: u64,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, capacity: usize, log_failures: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            disk_hits: stats.disk_hits,
            evictions: stats.evictions,
            size: stats.size,
            capacity,
            hit_rate: stats.hit_rate(),
            log_failures,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
