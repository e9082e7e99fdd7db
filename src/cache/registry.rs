//! Group Registry
//!
//! Name-to-group lookup shared by the manager, its workers and the HTTP
//! listener. Groups are only ever added or replaced, never removed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::warn;

use crate::cache::Group;
use crate::error::{CacheError, Result};

#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `group` under its name; the last registration wins.
    pub fn insert(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        let previous = self
            .groups
            .write()
            .insert(group.name().to_string(), group.clone());

        if previous.is_some() {
            warn!(group = %group.name(), "Replaced existing group registration");
        }
        group
    }

    /// Looks up a group by name.
    pub fn get(&self, name: &str) -> Result<Arc<Group>> {
        self.groups
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::GroupNotFound(name.to_string()))
    }

    /// Snapshot of every registered group.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        self.groups.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    /// Sweeps expired entries from every group.
    ///
    /// The registry lock is released before any group is swept.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        self.groups()
            .iter()
            .map(|group| group.sweep_expired(now))
            .sum()
    }
}
