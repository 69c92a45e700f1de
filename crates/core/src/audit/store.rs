use thiserror::Error;

use super::AuditRecord;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit store unavailable: {0}")]
    Unavailable(String),
}

/// Filter for querying audit events
#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub run_id: Option<String>,
    pub event_type: Option<String>,
    pub limit: usize,
}

impl Default for AuditFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditFilter {
    pub fn new() -> Self {
        Self {
            run_id: None,
            event_type: None,
            limit: 100,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.run_id
            .as_deref()
            .is_none_or(|id| record.run_id.as_deref() == Some(id))
            && self
                .event_type
                .as_deref()
                .is_none_or(|t| record.event_type == t)
    }
}

/// Trait for audit event storage
pub trait AuditStore: Send + Sync {
    /// Insert an audit record, returns the assigned ID
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError>;

    /// Query audit records, oldest first
    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError>;
}
