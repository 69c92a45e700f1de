use std::sync::Arc;

use tokio::sync::mpsc;

use super::{AuditEventEnvelope, AuditHandle, AuditRecord, AuditStore};

/// Background task that receives audit events and writes them to storage
pub struct AuditWriter {
    rx: mpsc::Receiver<AuditEventEnvelope>,
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    /// Create a new audit writer
    pub fn new(rx: mpsc::Receiver<AuditEventEnvelope>, store: Arc<dyn AuditStore>) -> Self {
        Self { rx, store }
    }

    /// Run the writer, consuming events until every handle is dropped
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Audit writer started");

        while let Some(envelope) = self.rx.recv().await {
            let record = AuditRecord {
                id: 0, // Assigned by the store
                timestamp: envelope.timestamp,
                event_type: envelope.event.event_type().to_string(),
                run_id: envelope.event.run_id().map(String::from),
                data: envelope.event,
            };

            tracing::debug!(
                event_type = %record.event_type,
                run_id = record.run_id.as_deref().unwrap_or("-"),
                "Audit event"
            );

            if let Err(e) = self.store.insert(&record) {
                tracing::error!("Failed to write audit event: {}", e);
            }
        }

        tracing::info!("Audit writer shutting down");
    }
}

/// Create a complete audit system
///
/// Returns:
/// - `AuditHandle` - for emitting events (clone this to share across tasks)
/// - `AuditWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
pub fn create_audit_system(
    store: Arc<dyn AuditStore>,
    buffer_size: usize,
) -> (AuditHandle, AuditWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = AuditHandle::new(tx);
    let writer = AuditWriter::new(rx, store);
    (handle, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::Stage;
    use crate::audit::{AuditError, AuditEvent, AuditFilter, MemoryAuditStore};

    struct FailingStore;

    impl AuditStore for FailingStore {
        fn insert(&self, _record: &AuditRecord) -> Result<i64, AuditError> {
            Err(AuditError::Unavailable("mock failure".to_string()))
        }

        fn query(&self, _filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_writer_stores_events_until_handles_dropped() {
        let store = Arc::new(MemoryAuditStore::new(100));
        let (handle, writer) = create_audit_system(Arc::clone(&store) as Arc<dyn AuditStore>, 10);
        let writer_task = tokio::spawn(writer.run());

        handle
            .emit(AuditEvent::StageEntered {
                run_id: "run-1".to_string(),
                stage: Stage::Verifying,
            })
            .await;
        handle
            .emit(AuditEvent::ServiceStopped {
                reason: "test".to_string(),
            })
            .await;

        drop(handle);
        writer_task.await.unwrap();

        let records = store.query(&AuditFilter::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_type, "stage_entered");
        assert_eq!(records[0].run_id.as_deref(), Some("run-1"));
        assert_eq!(records[1].run_id, None);
    }

    #[tokio::test]
    async fn test_writer_survives_store_failure() {
        let (handle, writer) = create_audit_system(Arc::new(FailingStore), 10);
        let writer_task = tokio::spawn(writer.run());

        handle
            .emit(AuditEvent::ServiceStopped {
                reason: "test".to_string(),
            })
            .await;

        drop(handle);
        writer_task.await.unwrap();
    }
}
