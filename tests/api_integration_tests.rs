//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use peer_cache::{
    api::{create_router, AppState},
    cache::{delete_queue, GroupRegistry},
    loader_fn, Group, Sink,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

struct TestApp {
    router: Router,
    registry: Arc<GroupRegistry>,
    loads: Arc<AtomicUsize>,
}

fn create_test_app() -> TestApp {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let registry = Arc::new(GroupRegistry::new());
    registry.insert(Group::new(
        "users",
        loader_fn(move |key: String, sink: Sink| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                match key.as_str() {
                    "ghost" => Ok(()),
                    "broken" => Err(anyhow::anyhow!("upstream timeout")),
                    _ => {
                        sink.set(key.clone(), format!("value for {key}"));
                        Ok(())
                    }
                }
            }
        }),
        Duration::from_secs(300),
    ));

    TestApp {
        router: create_router(AppState::new(registry.clone())),
        registry,
        loads,
    }
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == GET /:group/:key ==

#[tokio::test]
async fn test_get_endpoint_loads_on_miss() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "GET", "/users/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["group"], "users");
    assert_eq!(json["key"], "42");
    assert_eq!(json["value"], "value for 42");
    assert_eq!(app.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_endpoint_hit_skips_loader() {
    let app = create_test_app();

    send(&app.router, "GET", "/users/42").await;
    let (status, _) = send(&app.router, "GET", "/users/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_endpoint_loader_sets_nothing() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "GET", "/users/ghost").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_get_endpoint_loader_error() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "GET", "/users/broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "upstream timeout");
}

#[tokio::test]
async fn test_get_endpoint_unknown_group() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "GET", "/orders/1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("orders"));
}

// == GET /:group ==

#[tokio::test]
async fn test_group_endpoint_lists_entries() {
    let app = create_test_app();
    let group = app.registry.get("users").unwrap();
    group.set("b", "two");
    group.set("a", "one");

    let (status, json) = send(&app.router, "GET", "/users").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["group"], "users");
    assert_eq!(json["ttl_ms"], 300_000);
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["key"], "a");
    assert_eq!(entries[0]["value"], "one");
    assert!(entries[0]["expires_at"].is_string());
    assert_eq!(json["stats"]["total_entries"], 2);
}

#[tokio::test]
async fn test_group_endpoint_does_not_refresh_ttl() {
    let app = create_test_app();
    let group = app.registry.get("users").unwrap();
    group.set("k", "v");
    let before = group.snapshot()[0].expires_at;

    tokio::time::sleep(Duration::from_millis(10)).await;
    send(&app.router, "GET", "/users").await;

    assert_eq!(group.snapshot()[0].expires_at, before);
    assert_eq!(group.stats().hits, 0);
}

#[tokio::test]
async fn test_group_endpoint_unknown_group() {
    let app = create_test_app();

    let (status, _) = send(&app.router, "GET", "/orders").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == DELETE /:group/:key ==

#[tokio::test]
async fn test_delete_endpoint_evicts_key() {
    let app = create_test_app();
    app.registry.get("users").unwrap().set("k", "v");

    let (status, json) = send(&app.router, "DELETE", "/users/k").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("deleted successfully"));
    assert!(app.registry.get("users").unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_endpoint_absent_key_is_ok() {
    let app = create_test_app();

    let (status, _) = send(&app.router, "DELETE", "/users/never-set").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_endpoint_unknown_group_is_ok() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "DELETE", "/orders/1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("considered successful"));
}

#[tokio::test]
async fn test_delete_endpoint_does_not_echo_to_peers() {
    let (tx, mut rx) = delete_queue();
    let registry = Arc::new(GroupRegistry::new());
    let group = registry.insert(
        Group::new(
            "users",
            loader_fn(|_key: String, _sink: Sink| async { Ok(()) }),
            Duration::from_secs(60),
        )
        .with_delete_queue(tx),
    );
    group.set("k", "v");
    let router = create_router(AppState::new(registry));

    let (status, _) = send(&router, "DELETE", "/users/k").await;

    assert_eq!(status, StatusCode::OK);
    assert!(group.is_empty());
    assert!(rx.try_recv().is_none(), "peer deletes must not be re-queued");
}

#[tokio::test]
async fn test_delete_endpoint_decodes_key() {
    let app = create_test_app();
    let group = app.registry.get("users").unwrap();
    group.set("a/b", "v");

    let (status, _) = send(&app.router, "DELETE", "/users/a%2Fb").await;

    assert_eq!(status, StatusCode::OK);
    assert!(group.is_empty());
}
