//! Peer Discovery Task
//!
//! Periodically re-resolves the peer set and swaps it into the peer list.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::peers::{PeerList, PeerResolver};

/// Spawns the discovery task.
///
/// The first refresh happens immediately, then once per `watch_interval`.
pub fn spawn_discovery_task(
    resolver: Arc<dyn PeerResolver>,
    peers: Arc<PeerList>,
    watch_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = watch_interval.as_millis() as u64,
            "Peer discovery task started"
        );

        let mut ticker = interval(watch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let current = tokio::select! {
                        _ = cancel.cancelled() => break,
                        current = resolver.resolve() => current,
                    };
                    refresh_peers(&peers, current);
                }
            }
        }

        info!("Peer discovery task stopped");
    })
}

/// Installs `current` as the peer set and logs membership changes.
pub fn refresh_peers(peers: &PeerList, current: Vec<String>) {
    let diff = peers.replace(current);

    for peer in &diff.removed {
        info!(peer = %peer, "Peer has been removed");
    }
    for peer in &diff.added {
        info!(peer = %peer, "Peer has been added");
    }
    if diff.is_empty() {
        debug!(peers = peers.len(), "Peer set unchanged");
    }
}
