//! Response DTOs for the peer cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheValue, EntrySnapshot, Group, GroupStats};

/// Response body for fetching one key (GET /:group/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The group the key belongs to
    pub group: String,
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: CacheValue,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: CacheValue) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for the DELETE operation (DELETE /:group/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Outcome message
    pub message: String,
    /// The group addressed
    pub group: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Key removed (or already absent) from an existing group
    pub fn deleted(group: impl Into<String>, key: impl Into<String>) -> Self {
        let (group, key) = (group.into(), key.into());
        Self {
            message: format!("Key '{}' deleted successfully from group '{}'", key, group),
            group,
            key,
        }
    }

    /// Group unknown here; the deletion still counts as done
    pub fn group_missing(group: impl Into<String>, key: impl Into<String>) -> Self {
        let (group, key) = (group.into(), key.into());
        Self {
            message: format!(
                "Group '{}' not found, deletion of key '{}' is considered successful",
                group, key
            ),
            group,
            key,
        }
    }
}

/// One entry in a group listing
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub key: String,
    pub value: CacheValue,
    /// Wall-clock expiry
    pub expires_at: DateTime<Utc>,
    /// Milliseconds left before expiry
    pub ttl_remaining_ms: u64,
}

impl EntryView {
    fn from_snapshot(entry: EntrySnapshot, now: Instant, wall_now: DateTime<Utc>) -> Self {
        let remaining = entry.expires_at.saturating_duration_since(now);
        let expires_at = chrono::Duration::from_std(remaining)
            .ok()
            .and_then(|delta| wall_now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            key: entry.key,
            value: entry.value,
            expires_at,
            ttl_remaining_ms: remaining.as_millis() as u64,
        }
    }
}

/// Response body for listing a group (GET /:group)
#[derive(Debug, Clone, Serialize)]
pub struct GroupListing {
    pub group: String,
    /// Group TTL in milliseconds
    pub ttl_ms: u64,
    pub entries: Vec<EntryView>,
    pub stats: GroupStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl GroupListing {
    /// Builds a listing without refreshing any entry's TTL
    pub fn from_group(group: &Group) -> Self {
        let now = Instant::now();
        let wall_now = Utc::now();
        let stats = group.stats();

        Self {
            group: group.name().to_string(),
            ttl_ms: group.ttl().as_millis() as u64,
            entries: group
                .snapshot()
                .into_iter()
                .map(|entry| EntryView::from_snapshot(entry, now, wall_now))
                .collect(),
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
