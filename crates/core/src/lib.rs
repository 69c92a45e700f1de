pub mod acquisition;
pub mod audit;
pub mod config;
pub mod identity;
pub mod metrics;
pub mod poller;
pub mod services;
pub mod testing;

pub use acquisition::{
    AcquiredVoucher, AcquisitionConfig, AcquisitionError, AcquisitionOrchestrator, Stage,
};
pub use audit::{
    create_audit_system, AuditConfig, AuditError, AuditEvent, AuditFilter, AuditHandle,
    AuditRecord, AuditStore, AuditWriter, MemoryAuditStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use identity::{Credentials, Identity, IdentityGenerator, RandomIdentityGenerator};
pub use poller::{
    Delay, PollError, PollOutcome, PollerError, RetryPoller, RetryPolicy, TokioDelay,
};
pub use services::{
    AccountApi, DeviceId, FuelPrices, FuelQuote, FuelType, Mailbox, PriceSource, ServiceError,
    VerificationCode, VerifiedAccount, VoucherApi, VoucherLock,
};
