//! Integration tests for the detection bot's HTTP surface.
//!
//! These run the real router with no outbound credentials configured, so
//! replies are logged rather than delivered, and nothing leaves the
//! process.

use axum_test::TestServer;
use serde_json::json;

use vigil::api::{AppState, router};
use vigil::config::BotConfig;

fn test_config() -> BotConfig {
    BotConfig {
        port: 0,
        verify_token: Some("test-secret".to_string()),
        whatsapp_token: None,
        phone_number_id: None,
        huggingface_token: None,
        twilio: None,
    }
}

fn create_test_server() -> TestServer {
    let state = AppState::new(test_config());
    TestServer::new(router(state)).unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = create_test_server();

    let response = server.get("/").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["users"], 0);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_verification_handshake_echoes_challenge() {
    let server = create_test_server();

    let response = server
        .get("/webhook")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.verify_token", "test-secret")
        .add_query_param("hub.challenge", "1234")
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "1234");
}

#[tokio::test]
async fn test_verification_rejects_wrong_token() {
    let server = create_test_server();

    let response = server
        .get("/webhook")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.verify_token", "wrong")
        .add_query_param("hub.challenge", "1234")
        .await;

    response.assert_status(axum::http::StatusCode::FORBIDDEN);
    assert_eq!(response.text(), "Verification failed");
}

#[tokio::test]
async fn test_verification_rejects_missing_params() {
    let server = create_test_server();

    let response = server.get("/webhook").await;

    response.assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_verification_rejects_when_no_secret_configured() {
    let mut config = test_config();
    config.verify_token = None;
    let server = TestServer::new(router(AppState::new(config))).unwrap();

    let response = server
        .get("/webhook")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.verify_token", "")
        .add_query_param("hub.challenge", "1234")
        .await;

    response.assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_whatsapp_webhook_acknowledges_foreign_objects() {
    let server = create_test_server();

    let response = server
        .post("/webhook")
        .json(&json!({ "object": "instagram", "entry": [] }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_whatsapp_text_message_is_handled_and_tracked() {
    let server = create_test_server();

    let response = server
        .post("/webhook")
        .json(&json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messages": [{
                            "from": "15550001111",
                            "type": "text",
                            "text": { "body": "help" }
                        }]
                    }
                }]
            }]
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");

    // The sender now shows up in the health user count
    let health: serde_json::Value = server.get("/health").await.json();
    assert_eq!(health["users"], 1);
}

#[tokio::test]
async fn test_whatsapp_event_with_missing_optional_fields() {
    // Delivery-status events have no messages array at all
    let server = create_test_server();

    let response = server
        .post("/webhook")
        .json(&json!({
            "object": "whatsapp_business_account",
            "entry": [{ "changes": [{ "field": "statuses", "value": {} }] }]
        }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_twilio_webhook_requires_from() {
    let server = create_test_server();

    let response = server
        .post("/twilio-webhook")
        .form(&[("Body", "hello")])
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Missing From parameter");
}

#[tokio::test]
async fn test_twilio_text_message_is_acknowledged() {
    let server = create_test_server();

    let response = server
        .post("/twilio-webhook")
        .form(&[
            ("From", "whatsapp:+15550001111"),
            ("To", "whatsapp:+15559990000"),
            ("Body", "stats"),
            ("MessageSid", "SM123"),
        ])
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");

    let health: serde_json::Value = server.get("/health").await.json();
    assert_eq!(health["users"], 1);
}
