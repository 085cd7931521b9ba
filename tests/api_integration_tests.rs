//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use craw_cache::{api::create_router, AppState, CacheConfig};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::from_config(CacheConfig::new("api")).unwrap())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

// == PUT / GET ==

#[tokio::test]
async fn test_put_then_get_roundtrip() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put("/cache/page:1", r#"{"value":{"title":"home","links":3}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("page:1"));

    let response = app.oneshot(get("/cache/page:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "page:1");
    assert_eq!(json["value"]["title"], "home");
    assert_eq!(json["value"]["links"], 3);
}

#[tokio::test]
async fn test_put_with_zero_ttl_reads_as_missing() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put("/cache/flash", r#"{"value":"x","ttl":0}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/cache/flash")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/cache/flash/exists")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["exists"], false);
}

#[tokio::test]
async fn test_put_malformed_body() {
    let app = create_test_app();

    let response = app
        .oneshot(put("/cache/bad", r#"{"not_value": 1}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_get_not_found_has_error_body() {
    let app = create_test_app();

    let response = app.oneshot(get("/cache/nonexistent_key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

// == MGET ==

#[tokio::test]
async fn test_mget_preserves_order_and_length() {
    let app = create_test_app();

    app.clone()
        .oneshot(put("/cache/a", r#"{"value":1}"#))
        .await
        .unwrap();
    app.clone()
        .oneshot(put("/cache/c", r#"{"value":3}"#))
        .await
        .unwrap();

    let response = app
        .oneshot(post("/mget", r#"{"keys":["c","b","a"]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["values"], serde_json::json!([3, null, 1]));
}

// == DELETE / DELAY ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put("/cache/delete_key", r#"{"value":"v"}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(delete("/cache/delete_key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/cache/delete_key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(delete("/cache/delete_key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delay_endpoint() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(post("/cache/missing/delay", r#"{"ttl":10}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.clone()
        .oneshot(put("/cache/session", r#"{"value":"s"}"#))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(post("/cache/session/delay", r#"{"ttl":30}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/cache/session")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == CLEAR ==

#[tokio::test]
async fn test_clear_prefix_endpoint() {
    let app = create_test_app();

    for key in ["user:1", "user:2", "order:1"] {
        app.clone()
            .oneshot(put(&format!("/cache/{key}"), r#"{"value":true}"#))
            .await
            .unwrap();
    }

    let response = app.clone().oneshot(delete("/clear/user:")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);

    let response = app.clone().oneshot(get("/cache/user:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/cache/order:1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_clear_all_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put("/cache/k", r#"{"value":"v"}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(delete("/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/stats")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_entries"], 0);
    assert_eq!(json["current_size"], 0);
}

#[tokio::test]
async fn test_batch_route_names_are_ordinary_keys() {
    let app = create_test_app();

    for key in ["mget", "clear", "prefix"] {
        let response = app
            .clone()
            .oneshot(put(&format!("/cache/{key}"), r#"{"value":1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(post("/mget", r#"{"keys":["mget","clear","prefix"]}"#))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["values"], serde_json::json!([1, 1, 1]));

    let response = app.clone().oneshot(delete("/clear/pre")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 1);

    let response = app.oneshot(get("/cache/mget")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == STATS / HEALTH ==

#[tokio::test]
async fn test_stats_endpoint_tracks_requests() {
    let app = create_test_app();

    app.clone()
        .oneshot(put("/cache/k", r#"{"value":"v"}"#))
        .await
        .unwrap();
    app.clone().oneshot(get("/cache/k")).await.unwrap();
    app.clone().oneshot(get("/cache/other")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["name"], "api");
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    // "k" plus the compact JSON text "\"v\""
    assert_eq!(json["current_size"], 4);
    assert_eq!(json["hit_rate"].as_f64().unwrap(), 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}
