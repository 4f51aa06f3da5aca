//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, the in-memory sweeper, and the Axum server lifecycle.

use crate::config::{Config, mask_connection_string};
use crate::infrastructure::store::{KeyValueStore, MemoryStore, RedisStore, run_sweeper};
use crate::routes::app_router;
use crate::state::{AppState, ServiceSettings};

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How often expired entries are purged from the in-memory store.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Redis store (or in-memory fallback)
/// - Expired-key sweeper for the in-memory store
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The listen address is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = build_store(&config).await;

    let state = AppState::new(store, ServiceSettings::from(&config), config.behind_proxy);
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Connects to Redis when configured, otherwise (or on failure) falls back
/// to the in-process store.
async fn build_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if let Some(redis_url) = &config.redis_url {
        match RedisStore::connect(redis_url, config.store_timeout()).await {
            Ok(redis) => {
                tracing::info!("Store enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis at {}: {}. Using in-memory store.",
                    mask_connection_string(redis_url),
                    e
                );
            }
        }
    } else {
        tracing::info!("Redis not configured, using in-memory store");
    }

    let memory = Arc::new(MemoryStore::new());
    tokio::spawn(run_sweeper(memory.clone(), SWEEP_INTERVAL));
    memory
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
