//! Mock voucher API for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::{
    DeviceId, LockInTerms, ServiceError, VerifiedAccount, VoucherApi, VoucherLock,
};

use super::fixtures;

/// A recorded lock-in for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedLockIn {
    pub device: DeviceId,
    pub account: VerifiedAccount,
    pub terms: LockInTerms,
}

/// Mock implementation of the VoucherApi trait.
///
/// Answers every lock-in with a voucher echoing the submitted terms and
/// carrying [`fixtures::VOUCHER_CODE`].
#[derive(Debug)]
pub struct MockVoucherApi {
    code: String,
    reject: Arc<RwLock<bool>>,
    lock_ins: Arc<RwLock<Vec<RecordedLockIn>>>,
    next_error: Arc<RwLock<Option<ServiceError>>>,
}

impl Default for MockVoucherApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVoucherApi {
    pub fn new() -> Self {
        Self::with_code(fixtures::VOUCHER_CODE)
    }

    /// Create a mock that issues vouchers with `code`.
    pub fn with_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            reject: Arc::new(RwLock::new(false)),
            lock_ins: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// When set, lock-ins return no voucher.
    pub async fn set_reject(&self, reject: bool) {
        *self.reject.write().await = reject;
    }

    pub async fn set_next_error(&self, error: ServiceError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_lock_ins(&self) -> Vec<RecordedLockIn> {
        self.lock_ins.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.lock_ins.read().await.len()
    }
}

#[async_trait]
impl VoucherApi for MockVoucherApi {
    async fn lock_in(
        &self,
        device: &DeviceId,
        account: &VerifiedAccount,
        terms: &LockInTerms,
    ) -> Result<Option<VoucherLock>, ServiceError> {
        self.lock_ins.write().await.push(RecordedLockIn {
            device: device.clone(),
            account: account.clone(),
            terms: terms.clone(),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if *self.reject.read().await {
            return Ok(None);
        }
        Ok(Some(fixtures::voucher_for(terms, &self.code)))
    }
}
