//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired entries from every group.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::GroupRegistry;

/// Spawns a background task that periodically sweeps expired entries.
///
/// Each tick snapshots the registry and sweeps the groups one by one, so
/// the registry lock is never held while a group's entries are locked.
///
/// # Arguments
/// * `registry` - Shared group registry
/// * `cleanup_interval` - Time between sweeps
/// * `cancel` - Stops the task when cancelled
///
/// # Returns
/// A JoinHandle the manager awaits during shutdown.
pub fn spawn_cleanup_task(
    registry: Arc<GroupRegistry>,
    cleanup_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = cleanup_interval.as_millis() as u64,
            "TTL cleanup task started"
        );

        let start = tokio::time::Instant::now() + cleanup_interval;
        let mut ticker = interval_at(start, cleanup_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = registry.sweep_expired(Instant::now());

                    if removed > 0 {
                        info!(removed, "TTL cleanup: removed expired entries");
                    } else {
                        debug!("TTL cleanup: no expired entries found");
                    }
                }
            }
        }

        info!("TTL cleanup task stopped");
    })
}
