use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::acquisition::Stage;
use crate::services::FuelType;

/// Audit event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Workflow lifecycle
    AcquisitionStarted {
        run_id: String,
        fuel_type: FuelType,
        email: String,
    },
    StageEntered {
        run_id: String,
        stage: Stage,
    },
    StageCompleted {
        run_id: String,
        stage: Stage,
        duration_ms: u64,
    },
    VerificationPollAttempt {
        run_id: String,
        attempt: u32,
        max_attempts: u32,
        found: bool,
    },
    AcquisitionCompleted {
        run_id: String,
        fuel_type: FuelType,
        voucher_code: String,
        duration_ms: u64,
    },
    AcquisitionFailed {
        run_id: String,
        stage: Stage,
        reason: String,
        duration_ms: u64,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::AcquisitionStarted { .. } => "acquisition_started",
            Self::StageEntered { .. } => "stage_entered",
            Self::StageCompleted { .. } => "stage_completed",
            Self::VerificationPollAttempt { .. } => "verification_poll_attempt",
            Self::AcquisitionCompleted { .. } => "acquisition_completed",
            Self::AcquisitionFailed { .. } => "acquisition_failed",
        }
    }

    /// Workflow run this event belongs to, if any
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => None,
            Self::AcquisitionStarted { run_id, .. }
            | Self::StageEntered { run_id, .. }
            | Self::StageCompleted { run_id, .. }
            | Self::VerificationPollAttempt { run_id, .. }
            | Self::AcquisitionCompleted { run_id, .. }
            | Self::AcquisitionFailed { run_id, .. } => Some(run_id),
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub run_id: Option<String>,
    pub data: AuditEvent,
}
