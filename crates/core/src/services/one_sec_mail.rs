//! Disposable mailbox client for the 1secmail API.
//!
//! Any address on one of the service's domains receives mail without prior
//! setup, which is what lets a freshly generated identity be verified.

use std::time::Duration;

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{MailMessage, MailSummary, VerificationCode};
use super::{api_error, Mailbox, ServiceError};

/// Mailbox configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// API base URL (default: https://www.1secmail.com/api/v1/).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Domains generated identities may use.
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,
    /// Pattern locating the verification code; capture group 1 is the code.
    #[serde(default = "default_code_pattern")]
    pub code_pattern: String,
    /// Pattern matching the verification link; the whole match is the URL.
    #[serde(default = "default_link_pattern")]
    pub link_pattern: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_base_url() -> String {
    "https://www.1secmail.com/api/v1/".to_string()
}

fn default_domains() -> Vec<String> {
    vec![
        "1secmail.com".to_string(),
        "1secmail.net".to_string(),
        "1secmail.org".to_string(),
    ]
}

fn default_code_pattern() -> String {
    r"(?i)(?:verification code(?: is)?\W{1,5}|[?&](?:code|token)=)([A-Z0-9]{4,40})".to_string()
}

fn default_link_pattern() -> String {
    r#"(?i)https?://[^\s"'<>]*verif[^\s"'<>]*"#.to_string()
}

fn default_timeout() -> u32 {
    30
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            domains: default_domains(),
            code_pattern: default_code_pattern(),
            link_pattern: default_link_pattern(),
            timeout_secs: default_timeout(),
        }
    }
}

/// HTTP client for the 1secmail API.
pub struct OneSecMailClient {
    client: Client,
    base_url: String,
    code_pattern: Regex,
    link_pattern: Regex,
}

impl OneSecMailClient {
    /// Create a new client.
    pub fn new(config: MailboxConfig) -> Result<Self, ServiceError> {
        let code_pattern = Regex::new(&config.code_pattern).map_err(|e| {
            ServiceError::NotConfigured(format!("mailbox.code_pattern is invalid: {}", e))
        })?;
        let link_pattern = Regex::new(&config.link_pattern).map_err(|e| {
            ServiceError::NotConfigured(format!("mailbox.link_pattern is invalid: {}", e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
            code_pattern,
            link_pattern,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let response = self.client.get(&self.base_url).query(params).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| ServiceError::ParseError(format!("Failed to parse mailbox response: {}", e)))
    }
}

#[async_trait]
impl Mailbox for OneSecMailClient {
    async fn find_verification_code(
        &self,
        email: &str,
    ) -> Result<Option<VerificationCode>, ServiceError> {
        let summaries = self.list_messages(email).await?;
        debug!("Mailbox {} has {} message(s)", email, summaries.len());

        for summary in summaries {
            let Some(message) = self.read_message(email, summary.id).await? else {
                continue;
            };
            if let Some(code) = extract_code(&self.code_pattern, &message) {
                return Ok(Some(code));
            }
        }

        Ok(None)
    }

    async fn click_verification_link(&self, email: &str) -> Result<bool, ServiceError> {
        for summary in self.list_messages(email).await? {
            let Some(message) = self.read_message(email, summary.id).await? else {
                continue;
            };
            let Some(link) = extract_link(&self.link_pattern, &message) else {
                continue;
            };

            debug!("Following verification link in message {} for {}", message.id, email);
            let status = self.client.get(&link).send().await?.status();
            if !status.is_success() {
                warn!("Verification link for {} answered {}", email, status);
            }
            return Ok(status.is_success());
        }

        debug!("No verification link in mailbox {}", email);
        Ok(false)
    }

    async fn list_messages(&self, email: &str) -> Result<Vec<MailSummary>, ServiceError> {
        let (login, domain) = split_address(email)?;
        self.get(&[
            ("action", "getMessages"),
            ("login", login),
            ("domain", domain),
        ])
        .await
    }

    async fn read_message(&self, email: &str, id: u64) -> Result<Option<MailMessage>, ServiceError> {
        let (login, domain) = split_address(email)?;
        let id = id.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("action", "readMessage"),
                ("login", login),
                ("domain", domain),
                ("id", id.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        // Unknown ids come back as a plain-text "Message not found".
        let body = response.text().await?;
        match serde_json::from_str::<ReadMessageResponse>(&body) {
            Ok(message) => Ok(Some(message.into())),
            Err(_) if body.trim().eq_ignore_ascii_case("message not found") => Ok(None),
            Err(e) => Err(ServiceError::ParseError(format!(
                "Failed to parse message {}: {}",
                id, e
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadMessageResponse {
    id: u64,
    from: String,
    subject: String,
    date: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    text_body: Option<String>,
    #[serde(default)]
    html_body: Option<String>,
}

impl From<ReadMessageResponse> for MailMessage {
    fn from(r: ReadMessageResponse) -> Self {
        Self {
            id: r.id,
            from: r.from,
            subject: r.subject,
            date: r.date,
            body: r.body,
            text_body: r.text_body,
            html_body: r.html_body,
        }
    }
}

fn split_address(email: &str) -> Result<(&str, &str), ServiceError> {
    match email.split_once('@') {
        Some((login, domain)) if !login.is_empty() && !domain.is_empty() => Ok((login, domain)),
        _ => Err(ServiceError::Rejected(format!(
            "not a mailbox address: {}",
            email
        ))),
    }
}

/// Find the verification code in a message, preferring the plain-text body.
fn extract_code(pattern: &Regex, message: &MailMessage) -> Option<VerificationCode> {
    [
        message.text_body.as_deref(),
        Some(message.body.as_str()),
        message.html_body.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(|text| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| VerificationCode::new(m.as_str()))
    })
}

/// Find the verification link in a message. HTML entities in the query
/// string are decoded.
fn extract_link(pattern: &Regex, message: &MailMessage) -> Option<String> {
    [
        message.text_body.as_deref(),
        Some(message.body.as_str()),
        message.html_body.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(|text| pattern.find(text))
    .map(|m| m.as_str().replace("&amp;", "&"))
}
