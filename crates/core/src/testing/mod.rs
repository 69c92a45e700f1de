//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external service
//! trait, allowing the acquisition workflow and the HTTP API to be tested
//! end to end without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use fuelock_core::testing::{MockAccountApi, MockMailbox, RecordingDelay};
//!
//! // Code shows up on the fourth mailbox poll
//! let mailbox = MockMailbox::code_on_attempt(4, "ABC123");
//! let accounts = MockAccountApi::new();
//!
//! // ... run the orchestrator ...
//!
//! assert_eq!(mailbox.find_count().await, 4);
//! assert_eq!(accounts.verify_count().await, 1);
//! ```

mod mock_accounts;
mod mock_delay;
mod mock_identity;
mod mock_mailbox;
mod mock_prices;
mod mock_vouchers;

pub use mock_accounts::{MockAccountApi, RecordedRegistration, RecordedVerification};
pub use mock_delay::RecordingDelay;
pub use mock_identity::MockIdentityGenerator;
pub use mock_mailbox::MockMailbox;
pub use mock_prices::MockPriceSource;
pub use mock_vouchers::{MockVoucherApi, RecordedLockIn};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::identity::Identity;
    use crate::services::{
        FuelPrices, FuelQuote, FuelType, LockInTerms, MailMessage, VerifiedAccount, VoucherLock,
    };

    /// Voucher code returned by [`super::MockVoucherApi`] by default.
    pub const VOUCHER_CODE: &str = "V1";

    /// Create a test identity for `email`.
    pub fn identity(email: &str) -> Identity {
        Identity {
            email: email.to_string(),
            password: "Secret123passW0".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Citizen".to_string(),
            phone: "0412345678".to_string(),
            birth_timestamp: 500_000_000,
        }
    }

    /// Create a quote located in Sydney.
    pub fn fuel_quote(fuel_type: FuelType, price: f64) -> FuelQuote {
        FuelQuote {
            fuel_type,
            price,
            lat: -33.8688,
            lng: 151.2093,
            suburb: Some("Sydney".to_string()),
            state: Some("NSW".to_string()),
        }
    }

    /// Price list with U91, E10 and Diesel (no LPG).
    pub fn fuel_prices() -> FuelPrices {
        [
            fuel_quote(FuelType::U91, 150.0),
            fuel_quote(FuelType::E10, 147.9),
            fuel_quote(FuelType::Diesel, 189.5),
        ]
        .into_iter()
        .map(|q| (q.fuel_type, q))
        .collect()
    }

    pub fn verified_account() -> VerifiedAccount {
        VerifiedAccount {
            account_id: "1".to_string(),
            device_secret_token: "d".to_string(),
            access_token: "a".to_string(),
        }
    }

    /// Voucher matching the submitted terms.
    pub fn voucher_for(terms: &LockInTerms, code: &str) -> VoucherLock {
        VoucherLock {
            code: code.to_string(),
            fuel_type: terms.fuel_type,
            litres: terms.litres,
            cents_per_litre: Some(150.0),
            lat: terms.lat,
            lng: terms.lng,
            expires_at: None,
        }
    }

    /// Verification email carrying `code` in its text body.
    pub fn verification_email(id: u64, code: &str) -> MailMessage {
        MailMessage {
            id,
            from: "noreply@7eleven.com.au".to_string(),
            subject: "Verify your account".to_string(),
            date: "2026-10-19 10:00:00".to_string(),
            body: format!("<p>Your verification code is: {}</p>", code),
            text_body: Some(format!("Your verification code is: {}", code)),
            html_body: None,
        }
    }
}
