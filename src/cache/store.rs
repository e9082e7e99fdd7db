//! Group Store Module
//!
//! The entry map behind a group: HashMap storage with sliding TTL expiration,
//! guarded by a reader/writer lock that belongs to this map alone.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheValue, GroupStats};
use crate::error::{CacheError, Result};

// == Entry Snapshot ==
/// Copy of one entry taken without refreshing its TTL.
#[derive(Debug, Clone)]
pub struct EntrySnapshot {
    pub key: String,
    pub value: CacheValue,
    pub expires_at: Instant,
}

// == Group Store ==
/// TTL-bounded key/value map shared by a group and the sinks it hands out.
#[derive(Debug)]
pub struct GroupStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// TTL applied uniformly to every entry
    ttl: Duration,
    /// Performance statistics
    stats: StatsCounters,
}

impl GroupStore {
    // == Constructor ==
    /// Creates an empty store whose entries live `ttl` past their last use.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            stats: StatsCounters::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Set ==
    /// Stores a key-value pair expiring `ttl` from now.
    ///
    /// If the key already exists, the value is overwritten and TTL is reset.
    pub fn set(&self, key: String, value: CacheValue) {
        let entry = CacheEntry::new(value, Instant::now(), self.ttl);
        self.entries.write().insert(key, entry);
    }

    // == Get ==
    /// Retrieves a value by key and slides its expiry forward.
    ///
    /// Expired entries are removed and reported as `Expired`.
    pub fn get(&self, key: &str) -> Result<CacheValue> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => {
                    self.stats.record_miss();
                    return Err(CacheError::NotFound(key.to_string()));
                }
                Some(entry) if !entry.is_expired_at(now) => {
                    entry.touch(now, self.ttl);
                    self.stats.record_hit();
                    return Ok(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        self.get_or_reap(key, Instant::now())
    }

    /// Write-locked half of `get`: the entry may have been replaced or
    /// removed since the read lock was released.
    fn get_or_reap(&self, key: &str, now: Instant) -> Result<CacheValue> {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(key).filter(|entry| !entry.is_expired_at(now)) {
            entry.touch(now, self.ttl);
            self.stats.record_hit();
            return Ok(entry.value.clone());
        }

        match entries.remove(key) {
            Some(_) => {
                self.stats.record_expirations(1);
                self.stats.record_miss();
                Err(CacheError::Expired(key.to_string()))
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Remove ==
    /// Removes an entry by key, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    // == Sweep Expired ==
    /// Removes every entry with `expires_at <= now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    // == Snapshot ==
    /// Copies every entry, sorted by key. Does not touch expiries.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        let mut snapshot: Vec<EntrySnapshot> = self
            .entries
            .read()
            .iter()
            .map(|(key, entry)| EntrySnapshot {
                key: key.clone(),
                value: entry.value.clone(),
                expires_at: entry.expires_at(),
            })
            .collect();
        snapshot.sort_by(|a, b| a.key.cmp(&b.key));
        snapshot
    }

    /// Returns the expiry of `key` without refreshing it.
    pub fn expires_at(&self, key: &str) -> Option<Instant> {
        self.entries.read().get(key).map(CacheEntry::expires_at)
    }

    // == Stats ==
    /// Returns current group statistics.
    pub fn stats(&self) -> GroupStats {
        self.stats.snapshot(self.len())
    }

    pub(crate) fn counters(&self) -> &StatsCounters {
        &self.stats
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
