//! Cache Module
//!
//! Named TTL groups with read-through loading, plus the delete-event queue
//! that carries local deletions to the propagation worker.

mod entry;
mod events;
mod group;
mod loader;
mod registry;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use events::{delete_queue, DeleteEvent, DeleteReceiver, DeleteSender};
pub use group::Group;
pub use loader::{loader_fn, Loader, LoaderFn, Sink};
pub use registry::GroupRegistry;
pub use stats::GroupStats;
pub use store::{EntrySnapshot, GroupStore};

/// Values held by a group.
pub type CacheValue = serde_json::Value;

// == Public Constants ==
/// TTL given to groups registered without one
pub const DEFAULT_GROUP_TTL: Duration = Duration::from_secs(60 * 60);
