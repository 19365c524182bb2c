//! API Routes
//!
//! Configures the Axum router with all query cache endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, health_handler, remove_handler, resolve_handler, stats_handler, store_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /resolve?query=..` - Cached result for a query
/// - `PUT /store` - Cache a computed result
/// - `DELETE /entry?query=..` - Drop a query from both tiers
/// - `POST /clear` - Empty the memory tier and reset statistics
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/resolve", get(resolve_handler))
        .route("/store", put(store_handler))
        .route("/entry", delete(remove_handler))
        .route("/clear", post(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn create_test_app(dir: &TempDir) -> Router {
        let config = Config {
            cache_dir: dir.path().join("queries"),
            log_path: dir.path().join("app.log"),
            ..Config::default()
        };
        create_router(AppState::from_config(&config).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_store_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/store")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query":"test","result":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/resolve?query=nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
