//! 7-Eleven account and fuel lock API client.
//!
//! Every request carries the per-run device id plus the app identification
//! headers the API expects from its mobile clients. Business rejections come
//! back as 4xx responses and are reported as `false` / `None`; anything else
//! that is not a success is a transport failure.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{DeviceId, LockInTerms, VerificationCode, VerifiedAccount, VoucherLock};
use super::{api_error, AccountApi, ServiceError, VoucherApi};
use crate::identity::Identity;

/// Account API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Base URL of the account and fuel lock API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional API key sent as `X-Api-Key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_os_name")]
    pub os_name: String,
    #[serde(default = "default_os_version")]
    pub os_version: String,
}

fn default_base_url() -> String {
    "https://711-goodcall.api.tigerspike.com/api/v1".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_app_version() -> String {
    "1.10.0.2044".to_string()
}

fn default_os_name() -> String {
    "Android".to_string()
}

fn default_os_version() -> String {
    "10".to_string()
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            app_version: default_app_version(),
            os_name: default_os_name(),
            os_version: default_os_version(),
        }
    }
}

/// HTTP client for registration, verification and lock-in.
pub struct SevenElevenClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    app_version: String,
    os_name: String,
    os_version: String,
}

impl SevenElevenClient {
    /// Create a new client.
    pub fn new(config: AccountsConfig) -> Result<Self, ServiceError> {
        if config.base_url.is_empty() {
            return Err(ServiceError::NotConfigured(
                "accounts.base_url is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|k| !k.is_empty()),
            app_version: config.app_version,
            os_name: config.os_name,
            os_version: config.os_version,
        })
    }

    fn post(&self, path: &str, device: &DeviceId) -> RequestBuilder {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header("X-DeviceID", device.as_str())
            .header("X-OsName", &self.os_name)
            .header("X-OsVersion", &self.os_version)
            .header("X-AppVersion", &self.app_version);

        if let Some(ref key) = self.api_key {
            request = request.header("X-Api-Key", key);
        }

        request
    }
}

#[async_trait]
impl AccountApi for SevenElevenClient {
    async fn register(&self, device: &DeviceId, identity: &Identity) -> Result<bool, ServiceError> {
        debug!("Registering account for {}", identity.email);

        let response = self
            .post("account/register", device)
            .json(&RegisterRequest::from(identity))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("Registration declined ({}): {}", status, body);
            return Ok(false);
        }
        Err(api_error(response).await)
    }

    async fn verify(
        &self,
        device: &DeviceId,
        code: &VerificationCode,
    ) -> Result<VerifiedAccount, ServiceError> {
        debug!("Verifying account with code {}", code);

        let response = self
            .post("account/verify", device)
            .json(&VerifyRequest {
                token: code.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Rejected(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let access_header = response
            .headers()
            .get("X-AccessToken")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await?;

        parse_verify_response(&body, access_header.as_deref())
    }
}

#[async_trait]
impl VoucherApi for SevenElevenClient {
    async fn lock_in(
        &self,
        device: &DeviceId,
        account: &VerifiedAccount,
        terms: &LockInTerms,
    ) -> Result<Option<VoucherLock>, ServiceError> {
        debug!(
            "Locking in {} litres of {} for account {}",
            terms.litres, terms.fuel_type, account.account_id
        );

        let response = self
            .post("FuelLock/Start", device)
            .header("X-DeviceSecret", &account.device_secret_token)
            .header("X-AccessToken", &account.access_token)
            .json(&LockInRequest {
                account_id: &account.account_id,
                fuel_type: terms.fuel_type.as_str(),
                number_of_litres: terms.litres,
                latitude: terms.lat,
                longitude: terms.lng,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("Lock-in declined ({}): {}", status, body);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let body = response.text().await?;
        parse_lock_in_response(&body, terms)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    surname: &'a str,
    phone_number: &'a str,
    dob_since_epoch: String,
}

impl<'a> From<&'a Identity> for RegisterRequest<'a> {
    fn from(identity: &'a Identity) -> Self {
        Self {
            email: &identity.email,
            password: &identity.password,
            first_name: &identity.first_name,
            surname: &identity.last_name,
            phone_number: &identity.phone,
            dob_since_epoch: identity.birth_timestamp.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VerifyResponse {
    account_id: serde_json::Value,
    device_secret_token: String,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LockInRequest<'a> {
    account_id: &'a str,
    fuel_type: &'a str,
    number_of_litres: u32,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LockInResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    cents_per_litre: Option<f64>,
    #[serde(default)]
    total_litres: Option<u32>,
    /// Unix seconds.
    #[serde(default)]
    expires_at: Option<i64>,
}

fn parse_verify_response(
    body: &str,
    access_header: Option<&str>,
) -> Result<VerifiedAccount, ServiceError> {
    let parsed: VerifyResponse = serde_json::from_str(body).map_err(|e| {
        ServiceError::ParseError(format!("Failed to parse verify response: {}", e))
    })?;

    let account_id = match parsed.account_id {
        serde_json::Value::String(s) if !s.is_empty() => s,
        serde_json::Value::Number(n) => n.to_string(),
        other => {
            return Err(ServiceError::ParseError(format!(
                "Unexpected account id: {}",
                other
            )))
        }
    };

    let access_token = access_header
        .map(String::from)
        .or(parsed.access_token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServiceError::ParseError("Verify response has no access token".to_string()))?;

    Ok(VerifiedAccount {
        account_id,
        device_secret_token: parsed.device_secret_token,
        access_token,
    })
}

fn parse_lock_in_response(
    body: &str,
    terms: &LockInTerms,
) -> Result<Option<VoucherLock>, ServiceError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" || trimmed == "false" {
        return Ok(None);
    }

    let parsed: LockInResponse = serde_json::from_str(trimmed).map_err(|e| {
        ServiceError::ParseError(format!("Failed to parse lock-in response: {}", e))
    })?;

    let Some(code) = parsed.code.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    Ok(Some(VoucherLock {
        code,
        fuel_type: terms.fuel_type,
        litres: parsed.total_litres.unwrap_or(terms.litres),
        cents_per_litre: parsed.cents_per_litre,
        lat: terms.lat,
        lng: terms.lng,
        expires_at: parsed
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
    }))
}
