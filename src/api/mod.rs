//! API Module
//!
//! HTTP handlers and routing for the peer-facing REST API.
//!
//! # Endpoints
//! - `DELETE /:group/:key` - Evict a key
//! - `GET /:group` - List a group's contents
//! - `GET /:group/:key` - Fetch a key's value

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
