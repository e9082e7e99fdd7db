//! Peers Module
//!
//! Peer discovery, the shared peer list, and the HTTP client used to
//! propagate deletions.

mod client;
mod directory;
mod list;

pub use client::{PeerClient, PEER_REQUEST_TIMEOUT};
pub use directory::{filter_peers, local_ips, resolve_peers, DnsPeerResolver, PeerResolver};
pub use list::{diff_peers, PeerDiff, PeerList};
