//! External services the acquisition workflow depends on.
//!
//! Each service is a trait so the orchestrator can be driven by real HTTP
//! clients in production and by the mocks in [`crate::testing`] in tests.

mod fuel_prices;
mod one_sec_mail;
mod seven_eleven;
mod types;

pub use fuel_prices::{FuelPricesConfig, ProjectZeroThreeClient};
pub use one_sec_mail::{MailboxConfig, OneSecMailClient};
pub use seven_eleven::{AccountsConfig, SevenElevenClient};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::Identity;

/// Errors that can occur when talking to an external service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// The service answered but refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured correctly.
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Account registration and verification.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Register a new account. `Ok(false)` means the API declined it.
    async fn register(&self, device: &DeviceId, identity: &Identity) -> Result<bool, ServiceError>;

    /// Exchange an emailed verification code for session credentials.
    async fn verify(
        &self,
        device: &DeviceId,
        code: &VerificationCode,
    ) -> Result<VerifiedAccount, ServiceError>;
}

/// Current fuel prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fuel_prices(&self) -> Result<FuelPrices, ServiceError>;
}

/// Disposable mailbox that receives the verification email.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Look for a verification code in the mailbox of `email`.
    ///
    /// `Ok(None)` means no matching message has arrived yet. Each call
    /// re-reads the mailbox; nothing is remembered between calls.
    async fn find_verification_code(
        &self,
        email: &str,
    ) -> Result<Option<VerificationCode>, ServiceError>;

    /// Follow the verification link in the newest message that has one.
    ///
    /// `Ok(false)` if no message carries a link or the link target answered
    /// with a non-success status.
    async fn click_verification_link(&self, email: &str) -> Result<bool, ServiceError>;

    /// List message headers, newest first.
    async fn list_messages(&self, email: &str) -> Result<Vec<MailSummary>, ServiceError>;

    /// Read one message. `Ok(None)` if it does not exist.
    async fn read_message(&self, email: &str, id: u64) -> Result<Option<MailMessage>, ServiceError>;
}

/// Voucher lock-in.
#[async_trait]
pub trait VoucherApi: Send + Sync {
    /// Lock in a price. `Ok(None)` means the API returned no usable voucher.
    async fn lock_in(
        &self,
        device: &DeviceId,
        account: &VerifiedAccount,
        terms: &LockInTerms,
    ) -> Result<Option<VoucherLock>, ServiceError>;
}

/// Map a non-success HTTP response into a [`ServiceError::ApiError`].
pub(crate) async fn api_error(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    ServiceError::ApiError { status, message }
}
