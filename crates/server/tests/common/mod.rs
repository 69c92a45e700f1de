//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling end-to-end testing without
//! reaching the real account, pricing or mailbox services.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use fuelock_core::{
    audit::AuditFilter,
    create_audit_system,
    testing::{
        MockAccountApi, MockIdentityGenerator, MockMailbox, MockPriceSource, MockVoucherApi,
        RecordingDelay,
    },
    AcquisitionConfig, AcquisitionOrchestrator, AuditStore, Config, MemoryAuditStore,
};

/// Re-export fixtures for test convenience
pub use fuelock_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Account registration and verification (MockAccountApi)
/// - Fuel prices (MockPriceSource)
/// - The disposable mailbox (MockMailbox)
/// - Voucher lock-in (MockVoucherApi)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_voucher() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/vouchers", json!({ "fuel_type": "U91" })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub accounts: Arc<MockAccountApi>,
    pub prices: Arc<MockPriceSource>,
    pub mailbox: Arc<MockMailbox>,
    pub vouchers: Arc<MockVoucherApi>,
    /// Waits between mailbox polls (recorded, not slept, unless paced)
    pub delay: Arc<RecordingDelay>,
    pub audit_store: Arc<MemoryAuditStore>,
    /// Server shutdown token shared with the app state
    pub shutdown: CancellationToken,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture whose mailbox delivers a code on the first poll.
    pub fn new() -> Self {
        Self::with_mailbox(MockMailbox::code_on_attempt(1, "ABC123"))
    }

    /// Create a fixture around a scripted mailbox.
    pub fn with_mailbox(mailbox: MockMailbox) -> Self {
        Self::build(mailbox, true)
    }

    /// Create a fixture whose runs sleep between mailbox polls on the tokio
    /// clock. Pair with `start_paused` to control the interval.
    pub fn with_paced_polling(mailbox: MockMailbox) -> Self {
        Self::build(mailbox, false)
    }

    fn build(mailbox: MockMailbox, record_delays: bool) -> Self {
        let accounts = Arc::new(MockAccountApi::new());
        let prices = Arc::new(MockPriceSource::new());
        let mailbox = Arc::new(mailbox);
        let vouchers = Arc::new(MockVoucherApi::new());
        let delay = Arc::new(RecordingDelay::new());
        let audit_store = Arc::new(MemoryAuditStore::new(1000));
        let shutdown = CancellationToken::new();

        let mut config = Config::default();
        config.accounts.api_key = Some("secret-api-key".to_string());

        // Create audit system
        let (audit_handle, audit_writer) =
            create_audit_system(Arc::clone(&audit_store) as Arc<dyn AuditStore>, 100);
        tokio::spawn(audit_writer.run());

        let orchestrator = AcquisitionOrchestrator::new(
            AcquisitionConfig::default(),
            Arc::new(MockIdentityGenerator::new()),
            accounts.clone(),
            prices.clone(),
            mailbox.clone(),
            vouchers.clone(),
        )
        .expect("default config is valid")
        .with_audit(audit_handle);
        let orchestrator = if record_delays {
            orchestrator.with_delay(delay.clone())
        } else {
            orchestrator
        };

        let state = Arc::new(fuelock_server::state::AppState::new(
            config,
            Arc::new(orchestrator),
            prices.clone(),
            mailbox.clone(),
            audit_store.clone(),
            shutdown.clone(),
        ));

        let router = fuelock_server::api::create_router(state);

        Self {
            router,
            accounts,
            prices,
            mailbox,
            vouchers,
            delay,
            audit_store,
            shutdown,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Wait until the audit writer has stored at least `count` events.
    pub async fn wait_for_audit_events(&self, count: usize) {
        for _ in 0..100 {
            if self.audit_store.len() >= count {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Wait until the audit writer has stored an event of `event_type`.
    pub async fn wait_for_audit_event(&self, event_type: &str) {
        let filter = AuditFilter::new().with_event_type(event_type);
        for _ in 0..100 {
            if !self.audit_store.query(&filter).unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
