//! Query Cache - HTTP service around the two-tier query cache
//!
//! Lets an out-of-process query pipeline resolve cached answers and store
//! freshly computed ones.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use query_cache::{api::create_router, AppState, Config};

/// Main entry point for the query cache service.
///
/// # Startup Sequence
/// 1. Load `.env` (if present) and initialize tracing
/// 2. Load configuration from environment variables
/// 3. Open the cache handle (claims the cache dir and log file)
/// 4. Create Axum router with all endpoints
/// 5. Serve until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "query_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting query cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: memory_capacity={}, cache_dir={}, log_path={}, log_max_age={}h, log_max_size={}MB, port={}",
        config.memory_capacity,
        config.cache_dir.display(),
        config.log_path.display(),
        config.log_max_age_hours,
        config.log_max_size_mb,
        config.server_port
    );

    let state = AppState::from_config(&config).context("failed to open query cache")?;
    state.cache.info("Query cache service started");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let stats = state.cache.stats();
    state.cache.info(format!(
        "Query cache service stopped: hits={}, misses={}, size={}",
        stats.hits, stats.misses, stats.size
    ));
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
