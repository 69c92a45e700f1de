use std::sync::Arc;

use fuelock_core::{
    AcquisitionOrchestrator, AuditStore, Config, Mailbox, PriceSource, SanitizedConfig,
};
use tokio_util::sync::CancellationToken;

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<AcquisitionOrchestrator>,
    prices: Arc<dyn PriceSource>,
    mailbox: Arc<dyn Mailbox>,
    audit_store: Arc<dyn AuditStore>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: Arc<AcquisitionOrchestrator>,
        prices: Arc<dyn PriceSource>,
        mailbox: Arc<dyn Mailbox>,
        audit_store: Arc<dyn AuditStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            orchestrator,
            prices,
            mailbox,
            audit_store,
            shutdown,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &AcquisitionOrchestrator {
        self.orchestrator.as_ref()
    }

    /// Shared handle for runs spawned onto their own task.
    pub fn orchestrator_handle(&self) -> Arc<AcquisitionOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    pub fn prices(&self) -> &dyn PriceSource {
        self.prices.as_ref()
    }

    pub fn mailbox(&self) -> &dyn Mailbox {
        self.mailbox.as_ref()
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    /// Cancelled when the server starts shutting down.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}
