//! Response models for the peer cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{DeleteResponse, EntryView, ErrorResponse, GetResponse, GroupListing};
