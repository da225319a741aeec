//! cachetrace - HTTP driver for the instrumented caching layer
//!
//! Serves store/retrieve, call replay and cached page fetches over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachetrace::api::{create_router, AppState};
use cachetrace::config::{Config, StoreBackend};
use cachetrace::memo::TtlConfig;
use cachetrace::store::{MemoryStore, RedisStore, SharedStore};
use cachetrace::tasks::spawn_cleanup_task;

/// Main entry point for the cachetrace server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the configured store (and start the expiry sweep for memory)
/// 4. Build the application state, which flushes the store
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachetrace=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cachetrace");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, redis={}, expiration_time={:?}, port={}",
        config.backend,
        config.redis_url(),
        config.expiration_time,
        config.server_port
    );

    let (store, cleanup_handle) = connect_store(&config).await?;

    let state = AppState::new(store, TtlConfig::from_config(&config))
        .await
        .context("failed to initialize cache")?;
    info!("Cache initialized");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the configured store; the memory backend also gets an expiry sweep.
async fn connect_store(config: &Config) -> anyhow::Result<(SharedStore, Option<JoinHandle<()>>)> {
    match config.backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.redis_url())
                .await
                .context("failed to connect to Redis")?;
            Ok((Arc::new(store), None))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            let handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            info!("Expiry sweep task started");
            Ok((Arc::new(store), Some(handle)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Expiry sweep task aborted");
    }
}
