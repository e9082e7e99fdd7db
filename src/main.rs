//! Peer Cache - demo entry point
//!
//! Starts a cache manager from environment configuration, exercises one
//! group, then serves peers until shutdown.

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peer_cache::{loader_fn, CacheManager, Config, Sink};

/// Main entry point for the peer cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the cache manager and its background workers
/// 4. Register an example group and run get / delete / get
/// 5. Wait for SIGINT/SIGTERM and close the manager
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peer_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peer Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: addr={:?}, peers={:?}, service={:?}, cleanup_interval={}s, watch_interval={}s",
        config.addr,
        config.peer_addresses,
        config.headless_service_name,
        config.cleanup_interval,
        config.watch_interval
    );

    let manager = CacheManager::start(config)
        .await
        .context("failed to start cache manager")?;

    let group = manager.create_group_default_ttl(
        "exampleGroup",
        loader_fn(|key: String, sink: Sink| async move {
            info!(key = %key, "Fetching key");
            sink.set(key.clone(), format!("Value for {key}"));
            Ok(())
        }),
    );

    match group.get_or_load("exampleKey").await {
        Ok(value) => info!("Value: {}", value),
        Err(err) => warn!("Error: {}", err),
    }

    group.delete("exampleKey");

    match group.get("exampleKey") {
        Ok(value) => info!("Value after deletion: {}", value),
        Err(err) => info!("Error after deletion: {}", err),
    }

    if manager.local_addr().is_some() {
        shutdown_signal().await;
    }

    manager.close().await;
    info!("Peer Cache shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
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
}
