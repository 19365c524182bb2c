//! API Module
//!
//! HTTP handlers and routing that expose the query cache to an
//! out-of-process pipeline.
//!
//! # Endpoints
//! - `GET /resolve?query=..` - Cached result for a query
//! - `PUT /store` - Cache a computed result
//! - `DELETE /entry?query=..` - Drop a query from both tiers
//! - `POST /clear` - Empty the memory tier and reset statistics
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
