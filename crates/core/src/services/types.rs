//! Domain types exchanged with the external services.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Fuel
// ============================================================================

/// Fuel grades sold at the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FuelType {
    E10,
    U91,
    U95,
    U98,
    Diesel,
    #[serde(rename = "LPG")]
    Lpg,
}

impl FuelType {
    pub const ALL: [FuelType; 6] = [
        FuelType::E10,
        FuelType::U91,
        FuelType::U95,
        FuelType::U98,
        FuelType::Diesel,
        FuelType::Lpg,
    ];

    /// Wire name used by the pricing and voucher APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::E10 => "E10",
            FuelType::U91 => "U91",
            FuelType::U95 => "U95",
            FuelType::U98 => "U98",
            FuelType::Diesel => "Diesel",
            FuelType::Lpg => "LPG",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a fuel type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fuel type: {0}")]
pub struct UnknownFuelType(pub String);

impl FromStr for FuelType {
    type Err = UnknownFuelType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e10" => Ok(FuelType::E10),
            "u91" | "unleaded" | "ulp" => Ok(FuelType::U91),
            "u95" => Ok(FuelType::U95),
            "u98" => Ok(FuelType::U98),
            "diesel" => Ok(FuelType::Diesel),
            "lpg" => Ok(FuelType::Lpg),
            _ => Err(UnknownFuelType(s.to_string())),
        }
    }
}

/// Best price for one fuel type and where to get it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelQuote {
    pub fuel_type: FuelType,
    /// Price as reported by the pricing source (cents per litre).
    pub price: f64,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// All quotes from one pricing lookup, keyed by fuel type.
pub type FuelPrices = HashMap<FuelType, FuelQuote>;

// ============================================================================
// Accounts
// ============================================================================

/// Device identifier sent with every account and voucher call.
///
/// A fresh one is generated per workflow run; the voucher API refuses to lock
/// a second price for a device it has already seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random 16 character hex identifier.
    pub fn generate() -> Self {
        let simple = uuid::Uuid::new_v4().simple().to_string();
        Self(simple[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Code extracted from the account verification email.
///
/// Surrounding whitespace is stripped on construction, so the value checked
/// for emptiness is the value submitted for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        if code.trim().len() == code.len() {
            Self(code)
        } else {
            Self(code.trim().to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for VerificationCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<VerificationCode> for String {
    fn from(code: VerificationCode) -> Self {
        code.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session credentials issued once an account is verified.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedAccount {
    pub account_id: String,
    pub device_secret_token: String,
    pub access_token: String,
}

impl fmt::Debug for VerifiedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedAccount")
            .field("account_id", &self.account_id)
            .field("device_secret_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Vouchers
// ============================================================================

/// Terms submitted when locking in a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInTerms {
    pub fuel_type: FuelType,
    pub litres: u32,
    pub lat: f64,
    pub lng: f64,
}

/// A voucher locked at a quoted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherLock {
    pub code: String,
    pub fuel_type: FuelType,
    pub litres: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cents_per_litre: Option<f64>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Mailbox
// ============================================================================

/// Message header as listed by the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailSummary {
    pub id: u64,
    pub from: String,
    pub subject: String,
    pub date: String,
}

/// Full message including its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: u64,
    pub from: String,
    pub subject: String,
    pub date: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
}
