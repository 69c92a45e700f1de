//! Mock account API for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::identity::Identity;
use crate::services::{AccountApi, DeviceId, ServiceError, VerificationCode, VerifiedAccount};

use super::fixtures;

/// A recorded registration for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRegistration {
    pub device: DeviceId,
    pub identity: Identity,
}

/// A recorded verification for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedVerification {
    pub device: DeviceId,
    pub code: VerificationCode,
}

/// Mock implementation of the AccountApi trait.
///
/// Provides controllable behavior for testing:
/// - Accept or decline registrations
/// - Track registrations and verifications for assertions
/// - Inject one-shot transport failures
#[derive(Debug)]
pub struct MockAccountApi {
    accept_registration: Arc<RwLock<bool>>,
    account: Arc<RwLock<VerifiedAccount>>,
    registrations: Arc<RwLock<Vec<RecordedRegistration>>>,
    verifications: Arc<RwLock<Vec<RecordedVerification>>>,
    /// If set, the next register call will fail with this error.
    next_register_error: Arc<RwLock<Option<ServiceError>>>,
    /// If set, the next verify call will fail with this error.
    next_verify_error: Arc<RwLock<Option<ServiceError>>>,
}

impl Default for MockAccountApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccountApi {
    /// Create a mock that accepts every registration and verification.
    pub fn new() -> Self {
        Self {
            accept_registration: Arc::new(RwLock::new(true)),
            account: Arc::new(RwLock::new(fixtures::verified_account())),
            registrations: Arc::new(RwLock::new(Vec::new())),
            verifications: Arc::new(RwLock::new(Vec::new())),
            next_register_error: Arc::new(RwLock::new(None)),
            next_verify_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a mock that declines registrations.
    pub fn rejecting() -> Self {
        let mut api = Self::new();
        api.accept_registration = Arc::new(RwLock::new(false));
        api
    }

    pub async fn set_accept_registration(&self, accept: bool) {
        *self.accept_registration.write().await = accept;
    }

    pub async fn set_account(&self, account: VerifiedAccount) {
        *self.account.write().await = account;
    }

    pub async fn set_next_register_error(&self, error: ServiceError) {
        *self.next_register_error.write().await = Some(error);
    }

    pub async fn set_next_verify_error(&self, error: ServiceError) {
        *self.next_verify_error.write().await = Some(error);
    }

    pub async fn recorded_registrations(&self) -> Vec<RecordedRegistration> {
        self.registrations.read().await.clone()
    }

    pub async fn recorded_verifications(&self) -> Vec<RecordedVerification> {
        self.verifications.read().await.clone()
    }

    pub async fn register_count(&self) -> usize {
        self.registrations.read().await.len()
    }

    pub async fn verify_count(&self) -> usize {
        self.verifications.read().await.len()
    }
}

#[async_trait]
impl AccountApi for MockAccountApi {
    async fn register(&self, device: &DeviceId, identity: &Identity) -> Result<bool, ServiceError> {
        self.registrations.write().await.push(RecordedRegistration {
            device: device.clone(),
            identity: identity.clone(),
        });

        if let Some(error) = self.next_register_error.write().await.take() {
            return Err(error);
        }
        Ok(*self.accept_registration.read().await)
    }

    async fn verify(
        &self,
        device: &DeviceId,
        code: &VerificationCode,
    ) -> Result<VerifiedAccount, ServiceError> {
        self.verifications.write().await.push(RecordedVerification {
            device: device.clone(),
            code: code.clone(),
        });

        if let Some(error) = self.next_verify_error.write().await.take() {
            return Err(error);
        }
        Ok(self.account.read().await.clone())
    }
}
