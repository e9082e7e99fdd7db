//! Background Tasks Module
//!
//! Long-lived workers owned by the cache manager. Each one stops when the
//! manager's cancellation token fires.
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired entries at the configured interval
//! - Peer Discovery: refreshes the peer list from the resolver
//! - Delete Propagation: forwards local deletions to peers
//! - HTTP Listener: serves the peer-facing API

mod cleanup;
mod discovery;
mod listener;
mod propagation;

pub use cleanup::spawn_cleanup_task;
pub use discovery::{refresh_peers, spawn_discovery_task};
pub use listener::spawn_listener_task;
pub use propagation::spawn_propagation_task;
