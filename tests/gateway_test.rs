//! Integration tests for the IPPanel gateway client against a mock server.
//!
//! Run with: cargo test --test gateway_test

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadrelay::sms::{GatewayError, IppanelClient};

const SEND_PATH: &str = "/sms/pattern/normal/send";

fn variables() -> HashMap<String, String> {
    HashMap::from([("code".to_string(), "u1".to_string())])
}

fn success_body(message_id: i64) -> serde_json::Value {
    json!({"status": "OK", "code": 200, "data": {"message_id": message_id}})
}

/// 200 with null data: a payload-shape failure the client retries.
fn null_data_body() -> serde_json::Value {
    json!({"status": "OK", "code": 200, "data": null})
}

#[tokio::test]
async fn send_pattern_posts_expected_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("Apikey", "secret-key"))
        .and(body_partial_json(json!({
            "code": "pat1",
            "sender": "3000",
            "recipient": "09121234567",
            "variable": {"code": "u1"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(777)))
        .expect(1)
        .mount(&server)
        .await;

    let client = IppanelClient::with_base_url("secret-key", &server.uri()).unwrap();
    let id = client
        .send_pattern("pat1", "3000", "09121234567", &variables())
        .await
        .unwrap();
    assert_eq!(id, 777);
}

#[tokio::test]
async fn send_pattern_retries_then_succeeds_with_backoff() {
    let server = MockServer::start().await;

    // First two attempts get a null-data payload, third succeeds.
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(null_data_body()))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(123_456)))
        .expect(1)
        .mount(&server)
        .await;

    let client = IppanelClient::with_base_url("k", &server.uri()).unwrap();
    let started = Instant::now();
    let id = client
        .send_pattern("pat1", "3000", "09121234567", &variables())
        .await
        .unwrap();

    assert_eq!(id, 123_456);
    // Linear backoff: 1s after the first failure, 2s after the second.
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn send_pattern_gives_up_after_three_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(null_data_body()))
        .expect(3)
        .mount(&server)
        .await;

    let client = IppanelClient::with_base_url("k", &server.uri()).unwrap();
    let err = client
        .send_pattern("pat1", "3000", "09121234567", &variables())
        .await
        .unwrap_err();

    match err {
        GatewayError::Exhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, GatewayError::EmptyData));
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn unauthorized_is_terminal_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = IppanelClient::with_base_url("wrong", &server.uri()).unwrap();
    let err = client
        .send_pattern("pat1", "3000", "09121234567", &variables())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Unauthorized { .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rate_limited_is_terminal_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let client = IppanelClient::with_base_url("k", &server.uri()).unwrap();
    let err = client
        .send_pattern("pat1", "3000", "09121234567", &variables())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::RateLimited { .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn business_error_carries_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": "error",
            "code": 422,
            "data": {"error": "recipient invalid"},
            "error_message": "recipient invalid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = IppanelClient::with_base_url("k", &server.uri()).unwrap();
    let err = client
        .send_pattern("pat1", "3000", "09121234567", &variables())
        .await
        .unwrap_err();

    match err {
        GatewayError::Api { code, message } => {
            assert_eq!(code, 422);
            assert_eq!(message, "recipient invalid");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_credit_parses_balance() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sms/accounting/credit/show"))
        .and(header("Apikey", "k"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "code": 200, "data": {"credit": 12345.67}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = IppanelClient::with_base_url("k", &server.uri()).unwrap();
    let credit = client.get_credit().await.unwrap();
    assert!((credit - 12345.67).abs() < f64::EPSILON);
}
