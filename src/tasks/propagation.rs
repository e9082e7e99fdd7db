//! Delete Propagation Task
//!
//! Drains the delete queue in arrival order and forwards each deletion to
//! every currently known peer.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{DeleteEvent, DeleteReceiver};
use crate::peers::{PeerClient, PeerList};

/// Spawns the propagation task.
///
/// Events are handled one at a time; the per-event peer calls run
/// concurrently and each is bounded by the client's timeout. On cancel the
/// queue is closed and anything still buffered is discarded.
pub fn spawn_propagation_task(
    mut events: DeleteReceiver,
    peers: Arc<PeerList>,
    client: PeerClient,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Delete propagation task started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = propagate(&client, &peers, &event) => {}
                        }
                    }
                    None => break,
                },
            }
        }

        events.close();
        let mut discarded = 0usize;
        while events.try_recv().is_some() {
            discarded += 1;
        }
        if discarded > 0 {
            warn!(discarded, "Delete propagation stopped with events still queued");
        }

        info!("Delete propagation task stopped");
    })
}

/// Sends one event to a snapshot of the current peers.
async fn propagate(client: &PeerClient, peers: &PeerList, event: &DeleteEvent) {
    let targets = peers.snapshot();
    if targets.is_empty() {
        debug!(group = %event.group, key = %event.key, "No peers to notify");
        return;
    }

    let acked = client.broadcast_delete(&targets, event).await;
    debug!(
        group = %event.group,
        key = %event.key,
        peers = targets.len(),
        acked,
        "Propagated delete"
    );
}
