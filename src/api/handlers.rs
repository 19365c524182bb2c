//! API Handlers
//!
//! HTTP request handlers for each query cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::handle::QueryCache;
use crate::models::{
    ClearResponse, ErrorResponse, HealthResponse, QueryParams, RemoveResponse, ResolveResponse,
    StatsResponse, StoreRequest, StoreResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide cache handle
    pub cache: Arc<QueryCache>,
}

impl AppState {
    /// Creates a new AppState around an opened handle.
    pub fn new(cache: QueryCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Opens the handle described by the Config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(QueryCache::open(config)?))
    }
}

/// Runs a cache call on the blocking pool; tier operations touch the filesystem.
async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&QueryCache) -> T + Send + 'static,
    T: Send + 'static,
{
    let cache = Arc::clone(&state.cache);
    tokio::task::spawn_blocking(move || f(&cache))
        .await
        .map_err(|e| CacheError::Internal(format!("cache task failed: {}", e)))
}

/// Handler for GET /resolve?query=...
///
/// Returns the cached result, or 404 so the caller computes it.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response> {
    let query = params.query.clone();
    let cached = run_blocking(&state, move |cache| cache.resolve(&query)).await?;

    Ok(match cached {
        Some(result) => Json(ResolveResponse::new(params.query, result)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "No cached result for query '{}'",
                params.query
            ))),
        )
            .into_response(),
    })
}

/// Handler for PUT /store
///
/// Caches a computed result. A persistence failure is reported as 500 even
/// though the result is already held in memory.
pub async fn store_handler(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidKey(error_msg));
    }

    let StoreRequest { query, result } = req;
    let key = query.clone();
    run_blocking(&state, move |cache| cache.store(&key, result)).await??;

    Ok(Json(StoreResponse::new(query)))
}

/// Handler for DELETE /entry?query=...
pub async fn remove_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<RemoveResponse>> {
    let query = params.query.clone();
    let removed = run_blocking(&state, move |cache| cache.remove(&query)).await??;

    Ok(Json(RemoveResponse::new(params.query, removed)))
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    run_blocking(&state, |cache| cache.clear()).await?;
    Ok(Json(ClearResponse::cleared()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let response = run_blocking(&state, |cache| {
        StatsResponse::new(&cache.stats(), cache.cache().capacity(), cache.log().failures())
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
