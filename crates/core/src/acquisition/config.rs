//! Acquisition configuration.

use serde::{Deserialize, Serialize};

use crate::poller::{PollerError, RetryPolicy};

/// Configuration for the acquisition workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Mailbox polls before giving up on the verification code.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait between mailbox polls (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Litres requested when locking in a voucher.
    #[serde(default = "default_lock_in_litres")]
    pub lock_in_litres: u32,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_poll_interval() -> u64 {
    2000 // 2 seconds
}

fn default_lock_in_litres() -> u32 {
    150
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval(),
            lock_in_litres: default_lock_in_litres(),
        }
    }
}

impl AcquisitionConfig {
    /// Polling policy for the AwaitingCode stage.
    pub fn retry_policy(&self) -> Result<RetryPolicy, PollerError> {
        RetryPolicy::from_millis(self.max_attempts, self.poll_interval_ms)
    }
}
