//! Cache Manager
//!
//! Owns the group registry, the peer list, the delete queue and the
//! background workers, and ties their lifetimes to one cancellation token.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::cache::{delete_queue, DeleteSender, Group, GroupRegistry, Loader, DEFAULT_GROUP_TTL};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::peers::{DnsPeerResolver, PeerClient, PeerList, PeerResolver, PEER_REQUEST_TIMEOUT};
use crate::tasks::{
    spawn_cleanup_task, spawn_discovery_task, spawn_listener_task, spawn_propagation_task,
};

/// A running cache instance.
///
/// Three operating modes follow from the configuration:
/// - discovery: a service name is set; peers are re-resolved periodically
/// - static: only `addr` is set; peers come from the configured list
/// - standalone: neither; no listener, no delete queue, no propagation
///
/// The delete queue and propagation worker exist exactly when the HTTP
/// listener does. Dropping the manager cancels its workers; `close` also
/// waits for them.
pub struct CacheManager {
    registry: Arc<GroupRegistry>,
    peers: Arc<PeerList>,
    delete_tx: Option<DeleteSender>,
    cancel: CancellationToken,
    workers: Vec<(&'static str, JoinHandle<()>)>,
    local_addr: Option<SocketAddr>,
    coalesce_loads: bool,
}

impl CacheManager {
    /// Starts a manager, resolving peers through DNS when a service name is set.
    pub async fn start(config: Config) -> Result<Self> {
        let resolver = config.headless_service_name.as_ref().map(|name| {
            Arc::new(DnsPeerResolver::new(name.clone(), config.discovery_port()))
                as Arc<dyn PeerResolver>
        });
        Self::launch(config, resolver).await
    }

    /// Starts a manager in discovery mode with a caller-supplied resolver.
    pub async fn start_with_resolver(
        config: Config,
        resolver: Arc<dyn PeerResolver>,
    ) -> Result<Self> {
        Self::launch(config, Some(resolver)).await
    }

    async fn launch(config: Config, resolver: Option<Arc<dyn PeerResolver>>) -> Result<Self> {
        let listen_addr = match (&resolver, &config.addr) {
            (Some(_), addr) => {
                let listen = config.discovery_listen_addr();
                if let Some(addr) = addr.as_ref().filter(|addr| **addr != listen) {
                    warn!(
                        addr = %addr,
                        listen = %listen,
                        "Discovery mode listens on the discovery port, ignoring the configured port"
                    );
                }
                Some(listen)
            }
            (None, Some(addr)) => Some(addr.clone()),
            (None, None) => None,
        };

        if listen_addr.is_none() && !config.peer_addresses.is_empty() {
            warn!("Static peers configured without a listening address, propagation disabled");
        }

        // Bind before spawning anything so a bind failure leaves nothing running.
        let listener = match &listen_addr {
            Some(addr) => Some(TcpListener::bind(addr).await.map_err(|source| {
                CacheError::Bind {
                    addr: addr.clone(),
                    source,
                }
            })?),
            None => None,
        };
        let client = match &listener {
            Some(_) => Some(PeerClient::new(PEER_REQUEST_TIMEOUT)?),
            None => None,
        };

        let initial_peers = match (&resolver, &listener) {
            (None, Some(_)) => config.static_peers(),
            _ => Vec::new(),
        };

        let mut manager = Self {
            registry: Arc::new(GroupRegistry::new()),
            peers: Arc::new(PeerList::new(initial_peers)),
            delete_tx: None,
            cancel: CancellationToken::new(),
            workers: Vec::new(),
            local_addr: None,
            coalesce_loads: config.coalesce_loads,
        };

        if let Some(interval) = config.sweep_interval() {
            manager.spawn_cleanup(interval);
        }

        if let Some(resolver) = resolver {
            let handle = spawn_discovery_task(
                resolver,
                manager.peers.clone(),
                config.discovery_interval(),
                manager.cancel.child_token(),
            );
            manager.workers.push(("discovery", handle));
        }

        if let (Some(listener), Some(client)) = (listener, client) {
            manager.local_addr = listener.local_addr().ok();

            let (delete_tx, delete_rx) = delete_queue();
            manager.delete_tx = Some(delete_tx);
            let handle = spawn_propagation_task(
                delete_rx,
                manager.peers.clone(),
                client,
                manager.cancel.child_token(),
            );
            manager.workers.push(("propagation", handle));

            let router = create_router(AppState::new(manager.registry.clone()));
            let handle = spawn_listener_task(listener, router, manager.cancel.child_token());
            manager.workers.push(("listener", handle));
        }

        info!(
            addr = ?manager.local_addr,
            peers = manager.peers.len(),
            workers = manager.workers.len(),
            coalesce_loads = manager.coalesce_loads,
            "Cache manager started"
        );
        Ok(manager)
    }

    fn spawn_cleanup(&mut self, interval: Duration) {
        let handle = spawn_cleanup_task(self.registry.clone(), interval, self.cancel.child_token());
        self.workers.push(("cleanup", handle));
    }

    // == Create Group ==
    /// Registers a group under `name`, replacing any previous one.
    ///
    /// The group is wired to the delete queue when propagation is active.
    pub fn create_group(
        &self,
        name: impl Into<String>,
        loader: impl Loader,
        ttl: Duration,
    ) -> Arc<Group> {
        let mut group = Group::new(name, loader, ttl).with_load_coalescing(self.coalesce_loads);
        if let Some(delete_tx) = &self.delete_tx {
            group = group.with_delete_queue(delete_tx.clone());
        }

        let group = self.registry.insert(group);
        info!(group = %group.name(), ttl_ms = ttl.as_millis() as u64, "Group created");
        group
    }

    /// Registers a group with the one-hour default TTL.
    pub fn create_group_default_ttl(&self, name: impl Into<String>, loader: impl Loader) -> Arc<Group> {
        self.create_group(name, loader, DEFAULT_GROUP_TTL)
    }

    // == Get Group ==
    pub fn get_group(&self, name: &str) -> Result<Arc<Group>> {
        self.registry.get(name)
    }

    /// Snapshot of the current peer addresses.
    pub fn peers(&self) -> Vec<String> {
        self.peers.snapshot()
    }

    /// Address the HTTP listener is bound to, if any.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of background workers started.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn propagates_deletes(&self) -> bool {
        self.delete_tx.is_some()
    }

    // == Close ==
    /// Stops every worker, closes the delete queue and waits for shutdown.
    pub async fn close(mut self) {
        info!("Closing cache manager");
        self.cancel.cancel();
        self.delete_tx = None;

        for (name, handle) in std::mem::take(&mut self.workers) {
            if let Err(err) = handle.await {
                warn!(worker = name, error = %err, "Worker ended abnormally");
            }
        }

        info!("Cache manager closed");
    }
}

impl Drop for CacheManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
