//! Peer Cache - An in-process TTL cache shared across a fleet
//!
//! Provides named groups with read-through loaders, sliding TTL expiration
//! and best-effort delete propagation to peer instances.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod peers;
pub mod tasks;

pub use cache::{loader_fn, CacheValue, DeleteEvent, Group, Loader, Sink};
pub use config::Config;
pub use error::{CacheError, Result};
pub use manager::CacheManager;
