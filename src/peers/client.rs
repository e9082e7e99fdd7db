//! Peer Client
//!
//! Issues best-effort `DELETE http://{peer}/{group}/{key}` calls.

use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, Url};
use tracing::debug;

use crate::cache::DeleteEvent;
use crate::error::{CacheError, Result};

/// Upper bound on a single peer call.
pub const PEER_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct PeerClient {
    http: Client,
}

impl PeerClient {
    /// Creates a client whose every request times out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        // Peers are cluster-internal; never route them through a proxy.
        let http = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|err| CacheError::Internal(format!("HTTP client setup failed: {err}")))?;
        Ok(Self { http })
    }

    /// Builds the delete URL, percent-encoding group and key as path segments.
    pub fn delete_url(peer: &str, group: &str, key: &str) -> Result<Url> {
        let unreachable = |reason: String| CacheError::PeerUnreachable {
            peer: peer.to_string(),
            reason,
        };

        let mut url = Url::parse(&format!("http://{peer}/"))
            .map_err(|err| unreachable(format!("invalid address: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| unreachable("address cannot carry a path".to_string()))?
            .clear()
            .push(group)
            .push(key);
        Ok(url)
    }

    /// Sends one delete to one peer. Any non-2xx answer counts as unreachable.
    pub async fn delete(&self, peer: &str, event: &DeleteEvent) -> Result<()> {
        let url = Self::delete_url(peer, &event.group, &event.key)?;
        let unreachable = |reason: String| CacheError::PeerUnreachable {
            peer: peer.to_string(),
            reason,
        };

        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|err| unreachable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(unreachable(format!("status {}", response.status())));
        }
        Ok(())
    }

    /// Sends `event` to every peer concurrently; failures are logged and dropped.
    ///
    /// Returns how many peers acknowledged the delete.
    pub async fn broadcast_delete(&self, peers: &[String], event: &DeleteEvent) -> usize {
        let results = join_all(peers.iter().map(|peer| self.delete(peer, event))).await;

        results
            .into_iter()
            .filter(|result| match result {
                Ok(()) => true,
                Err(err) => {
                    debug!(
                        group = %event.group,
                        key = %event.key,
                        error = %err,
                        "Dropping delete for unreachable peer"
                    );
                    false
                }
            })
            .count()
    }
}
