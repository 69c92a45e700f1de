//! Mock mailbox for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::{MailMessage, MailSummary, Mailbox, ServiceError, VerificationCode};

type CodeResponse = Result<Option<VerificationCode>, ServiceError>;

/// Mock implementation of the Mailbox trait.
///
/// `find_verification_code` answers from a script of queued responses, one
/// per call. Once the script runs out every call returns the fallback
/// (`Ok(None)` unless changed). Messages for the inspection endpoints are
/// stored per address; `click_verification_link` succeeds when a stored
/// message for the address contains a URL.
#[derive(Debug)]
pub struct MockMailbox {
    script: Arc<RwLock<VecDeque<CodeResponse>>>,
    fallback: Arc<RwLock<Option<VerificationCode>>>,
    finds: Arc<RwLock<Vec<String>>>,
    messages: Arc<RwLock<HashMap<String, Vec<MailMessage>>>>,
    clicks: Arc<RwLock<Vec<String>>>,
    next_click_error: Arc<RwLock<Option<ServiceError>>>,
}

impl Default for MockMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMailbox {
    /// Create a mailbox that never receives a code.
    pub fn new() -> Self {
        Self::with_script(VecDeque::new())
    }

    fn with_script(script: VecDeque<CodeResponse>) -> Self {
        Self {
            script: Arc::new(RwLock::new(script)),
            fallback: Arc::new(RwLock::new(None)),
            finds: Arc::new(RwLock::new(Vec::new())),
            messages: Arc::new(RwLock::new(HashMap::new())),
            clicks: Arc::new(RwLock::new(Vec::new())),
            next_click_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a mailbox that is empty for the first `attempt - 1` polls and
    /// returns `code` from poll `attempt` onwards.
    pub fn code_on_attempt(attempt: u32, code: &str) -> Self {
        let script = (1..attempt).map(|_| Ok(None)).collect();
        let mut mailbox = Self::with_script(script);
        mailbox.fallback = Arc::new(RwLock::new(Some(VerificationCode::new(code))));
        mailbox
    }

    /// Queue the answer for the next unscripted poll.
    pub async fn push_response(&self, code: Option<VerificationCode>) {
        self.script.write().await.push_back(Ok(code));
    }

    /// Queue a failure for the next unscripted poll.
    pub async fn push_error(&self, error: ServiceError) {
        self.script.write().await.push_back(Err(error));
    }

    pub async fn set_fallback(&self, code: Option<VerificationCode>) {
        *self.fallback.write().await = code;
    }

    /// Store a message in the mailbox of `email`.
    pub async fn add_message(&self, email: &str, message: MailMessage) {
        self.messages
            .write()
            .await
            .entry(email.to_string())
            .or_default()
            .push(message);
    }

    /// Addresses polled, one entry per call.
    pub async fn recorded_finds(&self) -> Vec<String> {
        self.finds.read().await.clone()
    }

    pub async fn find_count(&self) -> usize {
        self.finds.read().await.len()
    }

    /// Fail the next `click_verification_link` call.
    pub async fn set_next_click_error(&self, error: ServiceError) {
        *self.next_click_error.write().await = Some(error);
    }

    /// Addresses whose verification link was requested, one entry per call.
    pub async fn recorded_clicks(&self) -> Vec<String> {
        self.clicks.read().await.clone()
    }
}

#[async_trait]
impl Mailbox for MockMailbox {
    async fn find_verification_code(
        &self,
        email: &str,
    ) -> Result<Option<VerificationCode>, ServiceError> {
        self.finds.write().await.push(email.to_string());

        match self.script.write().await.pop_front() {
            Some(response) => response,
            None => Ok(self.fallback.read().await.clone()),
        }
    }

    async fn click_verification_link(&self, email: &str) -> Result<bool, ServiceError> {
        self.clicks.write().await.push(email.to_string());

        if let Some(error) = self.next_click_error.write().await.take() {
            return Err(error);
        }

        let messages = self.messages.read().await;
        Ok(messages.get(email).is_some_and(|list| {
            list.iter().any(|m| {
                [Some(m.body.as_str()), m.text_body.as_deref(), m.html_body.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|text| text.contains("://"))
            })
        }))
    }

    async fn list_messages(&self, email: &str) -> Result<Vec<MailSummary>, ServiceError> {
        let messages = self.messages.read().await;
        Ok(messages
            .get(email)
            .map(|list| {
                list.iter()
                    .rev()
                    .map(|m| MailSummary {
                        id: m.id,
                        from: m.from.clone(),
                        subject: m.subject.clone(),
                        date: m.date.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn read_message(&self, email: &str, id: u64) -> Result<Option<MailMessage>, ServiceError> {
        let messages = self.messages.read().await;
        Ok(messages
            .get(email)
            .and_then(|list| list.iter().find(|m| m.id == id).cloned()))
    }
}
