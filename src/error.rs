//! Error types for the query cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache tiers and the handle that owns them.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Query key cannot be used (empty)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Disk tier read or write failed
    #[error("Persistence error at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded or decoded for the disk tier
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another live handle in this process already owns the resource
    #[error("Resource already in use: {}", .0.display())]
    ResourceInUse(PathBuf),

    /// Internal error (e.g. a blocking task failed to join)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Persistence {
            path: path.into(),
            source,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            CacheError::ResourceInUse(_) => StatusCode::CONFLICT,
            CacheError::Persistence { .. }
            | CacheError::Serialization(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query cache.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Log Error Enum ==
/// Failure inside the retention log.
///
/// Never propagated into the cache path; the convenience logging methods
/// discard it after counting it.
#[derive(Error, Debug)]
pub enum LogError {
    /// The retention check could not inspect or delete the log file
    #[error("Log retention failed for {}: {source}", .path.display())]
    Retention {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The line could not be appended
    #[error("Log write failed for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_codes() {
        let resp = CacheError::InvalidKey("empty".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = CacheError::ResourceInUse(PathBuf::from("cache")).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let err = CacheError::persistence("cache/x.json", io::Error::other("disk full"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_persistence_message_names_path() {
        let err = CacheError::persistence(
            "cache/abc.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("cache/abc.json"));
        assert!(msg.contains("denied"));
    }
}
