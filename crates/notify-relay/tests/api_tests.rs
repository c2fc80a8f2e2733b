//! API integration tests.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use notify_relay::hub::ConsumerId;
use notify_relay::protocol::Event;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

mod common;
use common::test_app;

fn post_notify(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/notify")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_notify_success() {
    let (app, state) = test_app();

    let response = app
        .oneshot(post_notify(json!({
            "type": "booking_created",
            "message": "New booking",
            "data": {"booking_id": 42}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert!(json["message"].is_string());

    let stats = state.hub.stats().await.unwrap();
    assert_eq!(stats.broadcasts, 1);
}

#[tokio::test]
async fn test_notify_reaches_admitted_consumer() {
    let (app, state) = test_app();
    let (tx, mut rx) = mpsc::channel(8);
    state.hub.admit(ConsumerId::new(), tx).await.unwrap();

    let before = chrono::Utc::now();
    let response = app
        .oneshot(post_notify(json!({"type": "t", "message": "m", "data": {"a": 1}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let frame = rx.recv().await.unwrap();
    let event: Event = serde_json::from_str(frame.as_str()).unwrap();
    assert_eq!(event.kind, "t");
    assert_eq!(event.message, "m");
    assert_eq!(Value::Object(event.data), json!({"a": 1}));
    assert!(event.timestamp >= before && event.timestamp <= chrono::Utc::now());
}

#[tokio::test]
async fn test_notify_without_data_sends_empty_object() {
    let (app, state) = test_app();
    let (tx, mut rx) = mpsc::channel(8);
    state.hub.admit(ConsumerId::new(), tx).await.unwrap();

    let response = app
        .oneshot(post_notify(json!({"type": "t", "message": "m"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let frame = rx.recv().await.unwrap();
    let raw: Value = serde_json::from_str(frame.as_str()).unwrap();
    assert_eq!(raw["data"], json!({}));
    assert!(raw["timestamp"].is_string());
}

#[tokio::test]
async fn test_notify_rejects_empty_fields() {
    let cases = [
        json!({"type": "", "message": "m"}),
        json!({"type": "t", "message": ""}),
        json!({"message": "m"}),
        json!({"type": "t"}),
        json!({}),
    ];

    for body in cases {
        let (app, state) = test_app();
        let response = app.oneshot(post_notify(body.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");

        let json = body_json(response).await;
        assert_eq!(json["code"], "BAD_REQUEST");

        let stats = state.hub.stats().await.unwrap();
        assert_eq!(stats.broadcasts, 0, "body: {body}");
    }
}

#[tokio::test]
async fn test_notify_rejects_malformed_json() {
    let (app, state) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notify")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"type\": \"t\", "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.hub.stats().await.unwrap().broadcasts, 0);
}

#[tokio::test]
async fn test_notify_accepts_missing_content_type() {
    let (app, state) = test_app();
    let (tx, mut rx) = mpsc::channel(8);
    state.hub.admit(ConsumerId::new(), tx).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notify")
                .method(Method::POST)
                .body(Body::from(r#"{"type": "t", "message": "m"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");
    assert_eq!(state.hub.stats().await.unwrap().broadcasts, 1);

    let event: Event = serde_json::from_str(rx.recv().await.unwrap().as_str()).unwrap();
    assert_eq!(event.message, "m");
}

#[tokio::test]
async fn test_notify_ignores_declared_content_type() {
    let (app, state) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notify")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from(r#"{"type": "t", "message": "m"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.hub.stats().await.unwrap().broadcasts, 1);
}

#[tokio::test]
async fn test_notify_rejects_empty_body() {
    let (app, state) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notify")
                .method(Method::POST)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    assert_eq!(state.hub.stats().await.unwrap().broadcasts, 0);
}

#[tokio::test]
async fn test_notify_rejects_non_object_data() {
    let (app, _state) = test_app();

    let response = app
        .oneshot(post_notify(json!({"type": "t", "message": "m", "data": "nope"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notify_wrong_method() {
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (app, _state) = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/notify")
                    .method(method.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "method: {method}"
        );
    }
}

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, state) = test_app();
    let (tx, _rx) = mpsc::channel(8);
    state.hub.admit(ConsumerId::new(), tx).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["connections"], 1);
    assert_eq!(json["total_admitted"], 1);
    assert_eq!(json["broadcasts"], 0);
    assert!(json["uptime_secs"].is_u64());
}

#[tokio::test]
async fn test_index_page() {
    let (app, _state) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin_by_default() {
    let (app, _state) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notify")
                .method(Method::OPTIONS)
                .header(header::ORIGIN, "http://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|h| h.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let (app, state) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ws")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(state.hub.stats().await.unwrap().total_admitted, 0);
}
