//! End-to-end tests for the webhook ingress, driving the real router with
//! a mocked IPPanel gateway behind the dispatch path.
//!
//! Run with: cargo test --test webhook_test

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadrelay::config::{IppanelConfig, SmsConfig};
use leadrelay::server::{router, AppState};
use leadrelay::sms::{DedupCache, IppanelClient, PatternStore, SmsDispatcher};

const SEND_PATH: &str = "/sms/pattern/normal/send";

/// State wired to a mock gateway. SMS sending is enabled so the lead path
/// exercises the real dispatch code.
fn app_state(gateway_url: &str) -> AppState {
    let config = SmsConfig {
        enabled: true,
        ippanel: IppanelConfig {
            api_key: "test-key".to_string(),
            originator: "3000".to_string(),
            patterns: vec!["pat1".to_string(), "pat2".to_string()],
        },
    };
    let patterns = Arc::new(PatternStore::new(config.ippanel.patterns.clone()));
    let gateway = Arc::new(IppanelClient::with_base_url("test-key", gateway_url).unwrap());

    AppState {
        dispatcher: Arc::new(SmsDispatcher::with_gateway(config, patterns, Some(gateway))),
        dedup: DedupCache::new(),
    }
}

async fn mount_send_success(server: &MockServer, expected_sends: u64) {
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "code": 200, "data": {"message_id": 99}})),
        )
        .expect(expected_sends)
        .mount(server)
        .await;
}

fn webhook_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn lead_event(user_id: &str, phone: &str) -> String {
    json!({
        "type": "leed_created",
        "user_id": user_id,
        "payload": {"id": "L1", "type": "number", "value": phone, "message_id": "m1"}
    })
    .to_string()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let server = MockServer::start().await;
    let app = router(app_state(&server.uri()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn webhook_rejects_non_post() {
    let server = MockServer::start().await;
    let app = router(app_state(&server.uri()));

    let response = app
        .oneshot(Request::builder().method("GET").uri("/webhook").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn webhook_rejects_malformed_json() {
    let server = MockServer::start().await;
    let app = router(app_state(&server.uri()));

    let response = app.oneshot(webhook_request("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn lead_event_dispatches_sms_once_and_marks_sent() {
    let server = MockServer::start().await;
    mount_send_success(&server, 1).await;

    let state = app_state(&server.uri());
    let app = router(state.clone());

    let response = app.oneshot(webhook_request(&lead_event("u1", "09121234567"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");

    // The dedup cache now blocks the pair for the rest of the day.
    assert!(!state.dedup.should_send("09121234567", "u1").await);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_lead_same_day_is_not_redispatched() {
    let server = MockServer::start().await;
    mount_send_success(&server, 1).await;

    let state = app_state(&server.uri());

    for _ in 0..2 {
        let response = router(state.clone())
            .oneshot(webhook_request(&lead_event("u1", "09121234567")))
            .await
            .unwrap();
        // Both deliveries are acked even though only the first one sends.
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn numeric_user_id_is_normalized() {
    let server = MockServer::start().await;
    mount_send_success(&server, 1).await;

    let state = app_state(&server.uri());
    let body = json!({
        "type": "leed_created",
        "user_id": 42,
        "payload": {"id": "L2", "type": "number", "value": "09351112233"}
    })
    .to_string();

    let response = router(state.clone()).oneshot(webhook_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!state.dedup.should_send("09351112233", "42").await);
}

#[tokio::test]
async fn non_number_lead_is_ignored() {
    let server = MockServer::start().await;
    mount_send_success(&server, 0).await;

    let state = app_state(&server.uri());
    let body = json!({
        "type": "leed_created",
        "user_id": "u1",
        "payload": {"id": "L3", "type": "email", "value": "a@b.ir"}
    })
    .to_string();

    let response = router(state.clone()).oneshot(webhook_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_phone_lead_is_skipped_but_acked() {
    let server = MockServer::start().await;
    mount_send_success(&server, 0).await;

    let state = app_state(&server.uri());
    let response = router(state.clone())
        .oneshot(webhook_request(&lead_event("u1", "08121234567")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.received_requests().await.unwrap().is_empty());
    // Nothing was sent, so the pair stays sendable.
    assert!(state.dedup.should_send("08121234567", "u1").await);
}

#[tokio::test]
async fn gateway_failure_is_absorbed_and_pair_stays_sendable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let state = app_state(&server.uri());
    let response = router(state.clone())
        .oneshot(webhook_request(&lead_event("u1", "09121234567")))
        .await
        .unwrap();

    // Failures are logged, never surfaced to the platform.
    assert_eq!(response.status(), StatusCode::OK);
    // mark_sent only happens after a successful dispatch.
    assert!(state.dedup.should_send("09121234567", "u1").await);
}

#[tokio::test]
async fn observability_only_events_are_acked_without_side_effects() {
    let server = MockServer::start().await;
    mount_send_success(&server, 0).await;

    let state = app_state(&server.uri());

    for body in [
        json!({"type": "message_created", "user_id": "u1",
               "payload": {"id": "m1", "text": "شماره من 09121234567"}}),
        json!({"type": "comment_created", "user_id": "u1", "payload": {"id": "c1", "content": "hi"}}),
        json!({"type": "autoform_completed", "user_id": "u1", "payload": {"id": "f1"}}),
        json!({"type": "revalidate", "user_id": "u1", "payload": {}}),
        json!({"type": "totally_unknown", "user_id": "u1", "payload": {}}),
    ] {
        let response = router(state.clone())
            .oneshot(webhook_request(&body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // A phone inside a direct message is logged, never dispatched.
    assert!(server.received_requests().await.unwrap().is_empty());
}
