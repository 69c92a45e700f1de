use std::collections::VecDeque;
use std::sync::Mutex;

use super::{AuditError, AuditFilter, AuditRecord, AuditStore};

/// Bounded in-memory audit history. The oldest records are dropped first.
#[derive(Debug)]
pub struct MemoryAuditStore {
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    records: VecDeque<AuditRecord>,
}

impl MemoryAuditStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditStore for MemoryAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| AuditError::Unavailable(e.to_string()))?;

        inner.next_id += 1;
        let id = inner.next_id;
        let mut stored = record.clone();
        stored.id = id;

        if inner.records.len() == self.capacity {
            inner.records.pop_front();
        }
        inner.records.push_back(stored);
        Ok(id)
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| AuditError::Unavailable(e.to_string()))?;

        // Most recent `limit` matches, returned oldest first.
        let mut matched: Vec<AuditRecord> = inner
            .records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .take(filter.limit)
            .cloned()
            .collect();
        matched.reverse();
        Ok(matched)
    }
}
