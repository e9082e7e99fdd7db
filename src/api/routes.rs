//! API Routes
//!
//! Configures the Axum router with the peer-facing endpoints.

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{delete_handler, get_handler, group_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `DELETE /:group/:key` - Evict a key (used by peers)
/// - `GET /:group` - List a group's entries and stats
/// - `GET /:group/:key` - Fetch a key, loading it on a miss
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/:group", get(group_handler))
        .route("/:group/:key", get(get_handler).delete(delete_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
