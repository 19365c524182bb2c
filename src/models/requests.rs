//! Request DTOs for the query cache service
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Request body for the STORE operation (PUT /store)
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    /// The natural-language query
    pub query: String,
    /// The computed answer to cache
    pub result: String,
}

impl StoreRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.query.is_empty() {
            return Some("Query cannot be empty".to_string());
        }
        None
    }
}

/// Query string of GET /resolve and DELETE /entry (`?query=...`)
#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    pub query: String,
}
