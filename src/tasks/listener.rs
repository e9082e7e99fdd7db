//! HTTP Listener Task
//!
//! Serves the peer-facing API until the lifecycle token is cancelled.

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Spawns the HTTP listener with graceful shutdown on `cancel`.
///
/// There is no supervisor to restart the listener, so a serve error that
/// happens before cancellation terminates the process.
pub fn spawn_listener_task(
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        info!(addr = %addr, "HTTP listener started");

        let shutdown = cancel.clone();
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;

        if let Some(reason) = fatal_exit_reason(&result, cancel.is_cancelled()) {
            error!(addr = %addr, reason = %reason, "HTTP listener stopped unexpectedly, exiting process");
            std::process::exit(1);
        }

        match result {
            Err(err) => {
                error!(addr = %addr, error = %err, "HTTP listener failed during shutdown");
            }
            Ok(()) => info!(addr = %addr, "HTTP listener stopped"),
        }
    })
}

/// Why the listener's exit must take the process down, or `None` when it
/// stopped because of cancellation.
fn fatal_exit_reason(result: &std::io::Result<()>, cancelled: bool) -> Option<String> {
    match (result, cancelled) {
        (_, true) => None,
        (Err(err), false) => Some(err.to_string()),
        (Ok(()), false) => Some("serve returned before shutdown".to_string()),
    }
}
