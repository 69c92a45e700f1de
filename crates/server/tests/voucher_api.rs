//! HTTP API tests driven through the in-process router with mocks.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{fixtures, TestFixture};
use fuelock_core::audit::AuditFilter;
use fuelock_core::services::ServiceError;
use fuelock_core::testing::MockMailbox;
use fuelock_core::{AuditEvent, AuditStore, Stage};

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["accounts"]["api_key_configured"], true);
    assert_eq!(response.body["acquisition"]["max_attempts"], 10);

    let raw = response.body.to_string();
    assert!(!raw.contains("secret-api-key"));
}

#[tokio::test]
async fn test_acquire_voucher_success() {
    let fixture = TestFixture::with_mailbox(MockMailbox::code_on_attempt(4, "ABC123"));

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "U91" }))
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["voucher"]["code"], fixtures::VOUCHER_CODE);
    assert_eq!(response.body["voucher"]["fuel_type"], "U91");
    assert_eq!(response.body["voucher"]["litres"], 150);
    assert_eq!(response.body["identity"]["email"], "user1@1secmail.com");
    assert!(response.body["run_id"].is_string());

    assert_eq!(fixture.mailbox.find_count().await, 4);
    assert_eq!(fixture.delay.count(), 3);
}

#[tokio::test]
async fn test_acquire_voucher_accepts_alias() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "unleaded" }))
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["voucher"]["fuel_type"], "U91");
}

#[tokio::test]
async fn test_acquire_voucher_unknown_fuel_type() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "kerosene" }))
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("kerosene"));
    assert!(response.body.get("stage").is_none());
    assert_eq!(fixture.accounts.register_count().await, 0);
}

#[tokio::test]
async fn test_acquire_voucher_poll_exhausted() {
    let fixture = TestFixture::with_mailbox(MockMailbox::new());

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "U91" }))
        .await;

    assert_status!(response, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.body["stage"], "awaiting_code");
    assert_eq!(fixture.mailbox.find_count().await, 10);
    assert_eq!(fixture.accounts.verify_count().await, 0);
}

#[tokio::test]
async fn test_acquire_voucher_registration_rejected() {
    let fixture = TestFixture::new();
    fixture.accounts.set_accept_registration(false).await;

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "U91" }))
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["stage"], "registering");
    assert_eq!(response.body["error"], "registration rejected");
    assert_eq!(fixture.prices.call_count().await, 0);
    assert_eq!(fixture.mailbox.find_count().await, 0);
}

#[tokio::test]
async fn test_acquire_voucher_fuel_type_unavailable() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "LPG" }))
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["stage"], "price_lookup");
}

#[tokio::test]
async fn test_acquire_voucher_after_shutdown_is_cancelled() {
    let fixture = TestFixture::new();
    fixture.shutdown.cancel();

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "U91" }))
        .await;

    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["stage"], "registering");
    assert_eq!(fixture.accounts.register_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_client_disconnect_cancels_run() {
    let fixture = TestFixture::with_paced_polling(MockMailbox::new());
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/vouchers")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"fuel_type": "U91"}"#))
        .unwrap();

    // Polls run at 0s, 2s and 4s; the client goes away at 5s
    let call = fixture.router.clone().oneshot(request);
    let outcome = tokio::time::timeout(Duration::from_millis(5000), call).await;
    assert!(outcome.is_err(), "run should still be polling");

    fixture.wait_for_audit_event("acquisition_failed").await;
    assert_eq!(fixture.mailbox.find_count().await, 3);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fixture.mailbox.find_count().await, 3);
    assert_eq!(fixture.accounts.verify_count().await, 0);

    let failures = fixture
        .audit_store
        .query(&AuditFilter::new().with_event_type("acquisition_failed"))
        .unwrap();
    assert_eq!(failures.len(), 1);
    match &failures[0].data {
        AuditEvent::AcquisitionFailed { stage, reason, .. } => {
            assert_eq!(*stage, Stage::AwaitingCode);
            assert!(reason.contains("cancelled"), "reason: {}", reason);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_fuel_prices() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/fuel-prices").await;
    assert_status!(response, StatusCode::OK);

    let prices = response.body["prices"].as_array().unwrap();
    let types: Vec<&str> = prices
        .iter()
        .map(|p| p["fuel_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["E10", "U91", "Diesel"]);
}

#[tokio::test]
async fn test_fuel_prices_filtered() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/fuel-prices?fuel_type=diesel").await;
    assert_status!(response, StatusCode::OK);
    let prices = response.body["prices"].as_array().unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0]["fuel_type"], "Diesel");
}

#[tokio::test]
async fn test_fuel_prices_upstream_error() {
    let fixture = TestFixture::new();
    fixture
        .prices
        .set_next_error(ServiceError::ApiError {
            status: 503,
            message: "maintenance".into(),
        })
        .await;

    let response = fixture.get("/api/v1/fuel-prices").await;
    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("maintenance"));
}

#[tokio::test]
async fn test_mailbox_messages() {
    let fixture = TestFixture::new();
    fixture
        .mailbox
        .add_message("jane@1secmail.com", fixtures::verification_email(7, "XYZ"))
        .await;

    let response = fixture
        .get("/api/v1/mailbox/jane@1secmail.com/messages")
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["email"], "jane@1secmail.com");
    assert_eq!(response.body["messages"][0]["id"], 7);

    let response = fixture
        .get("/api/v1/mailbox/jane@1secmail.com/messages/7")
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.body["text_body"],
        "Your verification code is: XYZ"
    );

    let response = fixture
        .get("/api/v1/mailbox/jane@1secmail.com/messages/8")
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mailbox_rejected_address_is_bad_request() {
    let fixture = TestFixture::new();
    fixture
        .mailbox
        .set_next_click_error(ServiceError::Rejected(
            "not a mailbox address: not-an-address".to_string(),
        ))
        .await;
    let response = fixture
        .post("/api/v1/mailbox/not-an-address/verification-link", json!({}))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_click_verification_link() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/mailbox/jane@1secmail.com/verification-link", json!({}))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["clicked"], false);

    let mut message = fixtures::verification_email(3, "XYZ");
    message.html_body = Some(
        "<a href=\"https://example.test/account/verify?token=XYZ\">Verify</a>".to_string(),
    );
    fixture.mailbox.add_message("jane@1secmail.com", message).await;

    let response = fixture
        .post("/api/v1/mailbox/jane@1secmail.com/verification-link", json!({}))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["email"], "jane@1secmail.com");
    assert_eq!(response.body["clicked"], true);
    assert_eq!(
        fixture.mailbox.recorded_clicks().await,
        vec!["jane@1secmail.com".to_string(); 2]
    );

    fixture
        .mailbox
        .set_next_click_error(ServiceError::ApiError {
            status: 500,
            message: "mailbox down".to_string(),
        })
        .await;
    let response = fixture
        .post("/api/v1/mailbox/jane@1secmail.com/verification-link", json!({}))
        .await;
    assert_status!(response, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_audit_lists_run_events() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/vouchers", json!({ "fuel_type": "E10" }))
        .await;
    assert_status!(response, StatusCode::CREATED);
    let run_id = response.body["run_id"].as_str().unwrap().to_string();

    // started + 5 x (entered, completed) + 1 poll + completed
    fixture.wait_for_audit_events(13).await;

    let response = fixture
        .get(&format!("/api/v1/audit?run_id={}&limit=5", run_id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["limit"], 5);

    let events = response.body["events"].as_array().unwrap();
    assert_eq!(events.len(), 5);
    let last = events.last().unwrap();
    assert_eq!(last["event_type"], "acquisition_completed");
    assert_eq!(last["data"]["voucher_code"], fixtures::VOUCHER_CODE);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();

    fixture.get("/api/v1/health").await;
    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("fuelock_http_requests_total"));
}
