#![cfg(feature = "dashboard")]

use axum::http::StatusCode;
use coord_resolver::config::{ApiConfig, WalkConfig};
use coord_resolver::web::build_router;
use coord_resolver::{HttpLedgerClient, WalkSimulator};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn app_for(server: &MockServer) -> axum::Router {
    let client = HttpLedgerClient::new(ApiConfig {
        base_url: server.base_url(),
        timeout_seconds: Some(5),
        ..ApiConfig::default()
    });
    build_router(Arc::new(WalkSimulator::new(client, WalkConfig::default())))
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).to_string())
}

#[tokio::test]
async fn test_index_serves_dashboard() {
    let server = MockServer::start_async().await;
    let (status, body) = get(app_for(&server), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("DualSubstrate // Resolver"));
    assert!(body.contains("COORD Walk Simulator"));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start_async().await;
    let (status, body) = get(app_for(&server), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_resolve_requires_coordinate() {
    let server = MockServer::start_async().await;
    let (status, body) = post_json(app_for(&server), "/api/resolve", json!({"coordinate": " "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a coordinate.");
}

#[tokio::test]
async fn test_resolve_proxies_to_ledger() {
    let server = MockServer::start_async().await;
    let decode_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/web4/decode")
                .json_body(json!({"coordinate": "EV-Demo-Session-123"}));
            then.status(200).json_body(json!({
                "status": "success",
                "data": {"content": {"summary": "Demo", "claims": ["c1"]}, "meta": {"type": "episode"}}
            }));
        })
        .await;

    let (status, body) = post_json(
        app_for(&server),
        "/api/resolve",
        json!({"coordinate": "EV-Demo-Session-123"}),
    )
    .await;

    decode_mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["meta"]["type"], "episode");
    assert_eq!(body["meta"]["coherence"], "N/A");
    assert_eq!(body["content"]["claims"], json!(["c1"]));
}

#[tokio::test]
async fn test_resolve_failure_is_reported_in_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/web4/decode");
            then.status(404).json_body(json!({"error": "unknown namespace"}));
        })
        .await;

    let (status, body) = post_json(app_for(&server), "/api/resolve", json!({"coordinate": "ZZ:1"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["detail"], "unknown namespace");
}

#[tokio::test]
async fn test_walk_returns_trace_and_dot() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat/coord/walk");
            then.status(200).json_body(json!({
                "path": ["EV-1", "EV-2"],
                "termination_reason": "max_steps"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/web4/decode");
            then.status(404).json_body(json!({"detail": "not found"}));
        })
        .await;

    let (status, body) = post_json(
        app_for(&server),
        "/api/walk",
        json!({"start_coord": "EV-1", "hops": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trace"]["path"], json!(["EV-1", "EV-2"]));
    assert_eq!(body["trace"]["termination_reason"], "max_steps");
    assert_eq!(body["trace"]["nodes"].as_array().unwrap().len(), 2);
    assert!(body["dot"].as_str().unwrap().contains("digraph {"));
}

#[tokio::test]
async fn test_walk_validation_and_backend_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat/coord/walk");
            then.status(200).json_body(json!({"path": []}));
        })
        .await;

    let (status, body) = post_json(app_for(&server), "/api/walk", json!({"start_coord": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Start coordinate required.");

    let (status, _) = post_json(
        app_for(&server),
        "/api/walk",
        json!({"start_coord": "EV-1", "hops": 12}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(app_for(&server), "/api/walk", json!({"start_coord": "EV-1"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().starts_with("Backend returned no path"));
}

#[tokio::test]
async fn test_walk_honours_per_request_toggles() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat/coord/walk");
            then.status(200).json_body(json!({
                "path": ["EV-1", "EV-2"],
                "hop_scores": [{"score": 0.7}]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/web4/decode");
            then.status(404).json_body(json!({"detail": "not found"}));
        })
        .await;

    let (status, body) = post_json(
        app_for(&server),
        "/api/walk",
        json!({"start_coord": "EV-1", "hops": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trace"]["nodes"][0]["label"], "[0] EV-1");
    assert_eq!(body["show_inspection"], true);

    let (status, body) = post_json(
        app_for(&server),
        "/api/walk",
        json!({
            "start_coord": "EV-1",
            "hops": 1,
            "show_hop_numbers": false,
            "show_inspection": false
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trace"]["nodes"][0]["label"], "EV-1");
    assert_eq!(body["trace"]["nodes"][1]["label"], "EV-2");
    assert!(body["dot"].as_str().unwrap().contains("[label=\"EV-1\""));
    assert_eq!(body["show_inspection"], false);
}

#[tokio::test]
async fn test_index_has_walk_toggles() {
    let server = MockServer::start_async().await;
    let (_, body) = get(app_for(&server), "/").await;

    assert!(body.contains("Show hop numbers on nodes"));
    assert!(body.contains("Show walk inspection"));
}
