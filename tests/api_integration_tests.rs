//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tiered_cache::{api::create_router, AppState, Config};
use tower::ServiceExt;

// == Helper Functions ==

async fn create_test_app(tmp: &TempDir, memory_max: usize) -> Router {
    let config = Config {
        memory_max_entries: memory_max,
        ..Config::with_cache_dir(tmp.path().join("cache"))
    };
    let state = AppState::from_config(&config).await.unwrap();
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_request(key: &str, value: &str) -> Request<Body> {
    let body = serde_json::json!({ "key": key, "value": value }).to_string();
    Request::builder()
        .method("PUT")
        .uri("/set")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let response = app.oneshot(set_request("test_key", "test_value")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert!(json["disk_error"].is_null());

    // Written through to disk
    assert!(tmp.path().join("cache").join("test_key").is_file());
}

#[tokio::test]
async fn test_set_endpoint_invalid_key() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let response = app.oneshot(set_request("", "value")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_set_endpoint_malformed_json() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key": "missing value"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let set_response = app
        .clone()
        .oneshot(set_request("get_key", "get_value"))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get_request("/get/get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], "get_value");
    assert_eq!(json["tier"], "memory");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let response = app.oneshot(get_request("/get/nonexistent_key")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_endpoint_serves_evicted_key_from_disk() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 1).await;

    for key in ["first", "second"] {
        let response = app.clone().oneshot(set_request(key, key)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // "first" was pushed out of memory by "second"
    let response = app.clone().oneshot(get_request("/get/first")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], "first");
    assert_eq!(json["tier"], "disk");

    // ...and promoted back by that read
    let response = app.oneshot(get_request("/get/first")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tier"], "memory");
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let set_response = app
        .clone()
        .oneshot(set_request("delete_key", "delete_value"))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let del_response = app
        .clone()
        .oneshot(delete_request("/del/delete_key"))
        .await
        .unwrap();
    assert_eq!(del_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get_request("/get/delete_key")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
    assert!(!tmp.path().join("cache").join("delete_key").exists());
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let response = app
        .oneshot(delete_request("/del/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_clear_endpoint() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    for key in ["a", "b", "c"] {
        app.clone().oneshot(set_request(key, "v")).await.unwrap();
    }

    let response = app.clone().oneshot(delete_request("/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["disk_error"].is_null());

    for key in ["a", "b", "c"] {
        let response = app
            .clone()
            .oneshot(get_request(&format!("/get/{}", key)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    app.clone()
        .oneshot(set_request("stats_key", "stats_value"))
        .await
        .unwrap();

    // Hit
    app.clone()
        .oneshot(get_request("/get/stats_key"))
        .await
        .unwrap();

    // Miss in both tiers
    app.clone()
        .oneshot(get_request("/get/nonexistent"))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["memory"]["hits"], 1);
    assert_eq!(json["memory"]["misses"], 1);
    assert_eq!(json["memory"]["hit_rate"], 0.5);
    assert_eq!(json["disk"]["misses"], 1);
    assert_eq!(json["sizes"]["memory_entries"], 1);
    assert_eq!(json["sizes"]["disk_entries"], 1);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let tmp = TempDir::new().unwrap();
    let app = create_test_app(&tmp, 100).await;

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
