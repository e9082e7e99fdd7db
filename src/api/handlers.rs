//! API Handlers
//!
//! HTTP request handlers for the peer-facing endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::GroupRegistry;
use crate::error::{CacheError, Result};
use crate::models::{DeleteResponse, GetResponse, GroupListing};

/// Application state shared across all handlers.
///
/// Holds the manager's group registry; handlers never touch the peer list
/// or the delete queue.
#[derive(Clone)]
pub struct AppState {
    /// Shared group registry
    pub registry: Arc<GroupRegistry>,
}

impl AppState {
    /// Creates a new AppState over the given registry.
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }
}

fn require_non_empty(group: &str, key: &str) -> Result<()> {
    if group.is_empty() || key.is_empty() {
        return Err(CacheError::InvalidRequest(format!(
            "missing group name({}) or key({})",
            group, key
        )));
    }
    Ok(())
}

/// Handler for DELETE /:group/:key
///
/// Evicts the key locally. Peers call this while propagating their own
/// deletions, so nothing is re-broadcast from here.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    require_non_empty(&group, &key)?;

    match state.registry.get(&group) {
        Ok(g) => {
            let removed = g.evict(&key);
            debug!(group = %group, key = %key, removed, "Peer delete applied");
            Ok(Json(DeleteResponse::deleted(group, key)))
        }
        Err(_) => Ok(Json(DeleteResponse::group_missing(group, key))),
    }
}

/// Handler for GET /:group
///
/// Lists the group's entries and statistics without refreshing any TTL.
pub async fn group_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<GroupListing>> {
    let group = state.registry.get(&group)?;
    Ok(Json(GroupListing::from_group(&group)))
}

/// Handler for GET /:group/:key
///
/// Read-through fetch: runs the group's loader on a miss.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    require_non_empty(&group, &key)?;

    let g = state.registry.get(&group)?;
    let value = g.get_or_load(&key).await?;

    Ok(Json(GetResponse::new(group, key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{loader_fn, Group, Sink};
    use serde_json::json;
    use std::time::Duration;

    fn test_state() -> AppState {
        let registry = Arc::new(GroupRegistry::new());
        registry.insert(Group::new(
            "users",
            loader_fn(|key: String, sink: Sink| async move {
                if key != "ghost" {
                    sink.set(key.clone(), format!("value for {key}"));
                }
                Ok(())
            }),
            Duration::from_secs(60),
        ));
        AppState::new(registry)
    }

    fn path(group: &str, key: &str) -> Path<(String, String)> {
        Path((group.to_string(), key.to_string()))
    }

    #[tokio::test]
    async fn test_get_handler_loads_value() {
        let state = test_state();

        let response = get_handler(State(state.clone()), path("users", "42"))
            .await
            .unwrap();
        assert_eq!(response.value, json!("value for 42"));
        assert_eq!(state.registry.get("users").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_handler_miss() {
        let result = get_handler(State(test_state()), path("users", "ghost")).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_handler_unknown_group() {
        let result = get_handler(State(test_state()), path("nope", "k")).await;
        assert!(matches!(result, Err(CacheError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler_evicts() {
        let state = test_state();
        state.registry.get("users").unwrap().set("k", "v");

        let response = delete_handler(State(state.clone()), path("users", "k"))
            .await
            .unwrap();
        assert_eq!(response.key, "k");
        assert!(state.registry.get("users").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_handler_unknown_group_succeeds() {
        let response = delete_handler(State(test_state()), path("nope", "k"))
            .await
            .unwrap();
        assert!(response.message.contains("considered successful"));
    }

    #[tokio::test]
    async fn test_group_handler() {
        let state = test_state();
        state.registry.get("users").unwrap().set("k", "v");

        let listing = group_handler(State(state), Path("users".to_string()))
            .await
            .unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].value, json!("v"));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let result = get_handler(State(test_state()), path("users", "")).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
