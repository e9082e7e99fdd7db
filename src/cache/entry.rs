//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with sliding TTL support.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::CacheValue;

/// Upper bound used when `now + ttl` overflows `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// Represents a single cache entry with value and absolute expiry.
///
/// The expiry sits behind its own small lock so a hit can slide it forward
/// while the owning map is only read-locked.
#[derive(Debug)]
pub struct CacheEntry {
    /// The stored value
    pub value: CacheValue,
    /// Absolute expiry instant
    expires_at: Mutex<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after `now`.
    pub fn new(value: CacheValue, now: Instant, ttl: Duration) -> Self {
        Self::with_expiry(value, deadline(now, ttl))
    }

    /// Creates an entry with an explicit expiry instant.
    pub fn with_expiry(value: CacheValue, expires_at: Instant) -> Self {
        Self {
            value,
            expires_at: Mutex::new(expires_at),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= *self.expires_at.lock()
    }

    /// Returns the current expiry instant.
    pub fn expires_at(&self) -> Instant {
        *self.expires_at.lock()
    }

    // == Touch ==
    /// Slides the expiry to `now + ttl`.
    pub fn touch(&self, now: Instant, ttl: Duration) {
        *self.expires_at.lock() = deadline(now, ttl);
    }

    // == Time To Live ==
    /// Returns the time left before expiry, zero once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.expires_at().saturating_duration_since(now)
    }
}

// == Utility Functions ==
/// Returns `now + ttl`, saturating far in the future on overflow.
pub fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
