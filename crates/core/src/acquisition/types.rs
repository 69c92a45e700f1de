//! Types for the acquisition workflow.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Credentials;
use crate::services::{FuelType, ServiceError, VoucherLock};

/// Workflow stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Registering,
    PriceLookup,
    AwaitingCode,
    Verifying,
    LockingIn,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Registering => "registering",
            Stage::PriceLookup => "price_lookup",
            Stage::AwaitingCode => "awaiting_code",
            Stage::Verifying => "verifying",
            Stage::LockingIn => "locking_in",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run did not produce a voucher.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The account API declined the generated identity.
    #[error("registration rejected")]
    RegistrationRejected,

    /// The price list has no quote for the requested fuel.
    #[error("no price available for {0}")]
    FuelTypeUnavailable(FuelType),

    /// No verification code arrived within the polling budget.
    #[error("verification code not received after {attempts} attempts")]
    PollExhausted { attempts: u32 },

    /// The verification code was not accepted.
    #[error("verification rejected: {0}")]
    VerificationRejected(#[source] ServiceError),

    /// The voucher API returned no voucher.
    #[error("voucher lock-in rejected")]
    LockInRejected,

    /// A collaborator failed to answer.
    #[error("{stage} failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: ServiceError,
    },

    /// The run was cancelled.
    #[error("cancelled during {0}")]
    Cancelled(Stage),
}

impl AcquisitionError {
    /// Stage the run failed in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::RegistrationRejected => Stage::Registering,
            Self::FuelTypeUnavailable(_) => Stage::PriceLookup,
            Self::PollExhausted { .. } => Stage::AwaitingCode,
            Self::VerificationRejected(_) => Stage::Verifying,
            Self::LockInRejected => Stage::LockingIn,
            Self::Transport { stage, .. } | Self::Cancelled(stage) => *stage,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Successful run result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquiredVoucher {
    pub run_id: String,
    pub identity: Credentials,
    pub voucher: VoucherLock,
}
