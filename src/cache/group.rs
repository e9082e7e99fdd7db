//! Group Module
//!
//! A named TTL partition with read-through loading and delete notification.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::events::{DeleteEvent, DeleteSender};
use crate::cache::loader::{Loader, Sink};
use crate::cache::store::{EntrySnapshot, GroupStore};
use crate::cache::{CacheValue, GroupStats};
use crate::error::{CacheError, Result};

// == Group ==
/// Named key/value partition backed by a loader.
///
/// Every entry shares the group's TTL, and a successful read slides that
/// entry's expiry forward. Concurrent misses on one key each run the loader
/// unless load coalescing is switched on.
pub struct Group {
    name: String,
    store: Arc<GroupStore>,
    loader: Arc<dyn Loader>,
    delete_tx: Option<DeleteSender>,
    inflight: Option<InflightLoads>,
}

impl Group {
    // == Constructor ==
    /// Creates a standalone group: no delete queue, no load coalescing.
    pub fn new(name: impl Into<String>, loader: impl Loader, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            store: Arc::new(GroupStore::new(ttl)),
            loader: Arc::new(loader),
            delete_tx: None,
            inflight: None,
        }
    }

    /// Wires the group to a delete queue so deletions reach peers.
    pub fn with_delete_queue(mut self, delete_tx: DeleteSender) -> Self {
        self.delete_tx = Some(delete_tx);
        self
    }

    /// Chooses whether concurrent misses on the same key share one loader call.
    pub fn with_load_coalescing(mut self, enabled: bool) -> Self {
        self.inflight = enabled.then(InflightLoads::default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.store.ttl()
    }

    pub fn coalesces_loads(&self) -> bool {
        self.inflight.is_some()
    }

    pub fn is_wired(&self) -> bool {
        self.delete_tx.is_some()
    }

    // == Get ==
    /// Returns the cached value and slides its expiry to `now + ttl`.
    ///
    /// An expired entry is removed and reported as `Expired`.
    pub fn get(&self, key: &str) -> Result<CacheValue> {
        self.store.get(key)
    }

    // == Get Or Load ==
    /// Returns the cached value, running the loader on a miss.
    ///
    /// Loader errors come back as `LoaderFailed` and nothing is cached. A
    /// loader that succeeds without setting `key` yields `NotFound`.
    pub async fn get_or_load(&self, key: &str) -> Result<CacheValue> {
        if let Ok(value) = self.store.get(key) {
            return Ok(value);
        }

        match &self.inflight {
            Some(inflight) => {
                inflight
                    .run(key, || async {
                        // Another caller may have filled the key while we waited.
                        match self.store.get(key) {
                            Ok(value) => Ok(value),
                            Err(_) => self.load(key).await,
                        }
                    })
                    .await
            }
            None => self.load(key).await,
        }
    }

    async fn load(&self, key: &str) -> Result<CacheValue> {
        debug!(group = %self.name, key, "Cache miss, invoking loader");
        self.store.counters().record_load();

        if let Err(err) = self.loader.load(key.to_string(), self.sink()).await {
            self.store.counters().record_load_failure();
            warn!(group = %self.name, key, error = %err, "Loader failed");
            return Err(CacheError::LoaderFailed(err));
        }

        self.store.get(key)
    }

    // == Set ==
    /// Inserts or overwrites `key` with a fresh TTL.
    pub fn set(&self, key: impl Into<String>, value: impl Into<CacheValue>) {
        self.store.set(key.into(), value.into());
    }

    /// Returns a write-only handle onto this group.
    pub fn sink(&self) -> Sink {
        Sink::new(self.store.clone())
    }

    // == Delete ==
    /// Removes `key` locally, then enqueues a delete event for peers.
    ///
    /// The event is sent whether or not the key was present. Without a
    /// delete queue only the local removal happens.
    pub fn delete(&self, key: &str) {
        let removed = self.store.remove(key);
        debug!(group = %self.name, key, removed, "Deleted key");

        if let Some(delete_tx) = &self.delete_tx {
            delete_tx.send(DeleteEvent::new(&self.name, key));
        }
    }

    // == Evict ==
    /// Removes `key` locally without notifying peers.
    ///
    /// Used for deletions that arrive from a peer, which must not echo back.
    pub fn evict(&self, key: &str) -> bool {
        self.store.remove(key)
    }

    // == Sweep Expired ==
    /// Removes every entry with `expires_at <= now`; returns how many.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        self.store.sweep_expired(now)
    }

    /// Copies the current entries without refreshing their TTL.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        self.store.snapshot()
    }

    pub fn stats(&self) -> GroupStats {
        self.store.stats()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("ttl", &self.store.ttl())
            .field("entries", &self.store.len())
            .field("wired", &self.delete_tx.is_some())
            .field("coalesce_loads", &self.inflight.is_some())
            .finish()
    }
}

// == Inflight Loads ==
/// Per-key gates that serialize loads of the same key.
#[derive(Default)]
struct InflightLoads {
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl InflightLoads {
    async fn run<F, Fut, T>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let gate = GateGuard {
            loads: self,
            key,
            gate: self.gates.lock().entry(key.to_string()).or_default().clone(),
        };

        let _permit = gate.gate.lock().await;
        f().await
    }
}

/// Holds one caller's reference to a key's gate and releases it on drop,
/// including when the waiting or loading future is cancelled.
struct GateGuard<'a> {
    loads: &'a InflightLoads,
    key: &'a str,
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        // Clones are only made under the map lock, so the count is exact here.
        let mut gates = self.loads.gates.lock();
        if Arc::strong_count(&self.gate) == 2 {
            gates.remove(self.key);
        }
    }
}
