//! Delete Events
//!
//! Ordered handoff of local deletions from groups to the propagation worker.

use tokio::sync::mpsc;
use tracing::debug;

// == Delete Event ==
/// Notice that `key` was deleted locally from `group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEvent {
    pub group: String,
    pub key: String,
}

impl DeleteEvent {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

/// Creates a FIFO delete queue.
///
/// The queue is unbounded so enqueueing never waits on the consumer.
pub fn delete_queue() -> (DeleteSender, DeleteReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (DeleteSender(tx), DeleteReceiver(rx))
}

// == Delete Sender ==
/// Producer half held by every group wired to the queue.
#[derive(Debug, Clone)]
pub struct DeleteSender(mpsc::UnboundedSender<DeleteEvent>);

impl DeleteSender {
    /// Enqueues an event. Returns false if the queue has been closed.
    pub fn send(&self, event: DeleteEvent) -> bool {
        match self.0.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                debug!(
                    group = %event.group,
                    key = %event.key,
                    "Delete queue closed, event dropped"
                );
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

// == Delete Receiver ==
/// Consumer half owned by the propagation worker.
#[derive(Debug)]
pub struct DeleteReceiver(mpsc::UnboundedReceiver<DeleteEvent>);

impl DeleteReceiver {
    /// Waits for the next event; `None` once closed and drained.
    pub async fn recv(&mut self) -> Option<DeleteEvent> {
        self.0.recv().await
    }

    /// Takes the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<DeleteEvent> {
        self.0.try_recv().ok()
    }

    /// Rejects further sends; buffered events stay readable.
    pub fn close(&mut self) {
        self.0.close();
    }
}
