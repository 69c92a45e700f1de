//! Voucher acquisition workflow.
//!
//! A run walks five dependent stages in a fixed order:
//! - **Registering**: submit a freshly generated identity
//! - **PriceLookup**: fetch current prices and pick the requested fuel
//! - **AwaitingCode**: poll the mailbox for the verification code
//! - **Verifying**: exchange the code for session credentials
//! - **LockingIn**: lock the quoted price into a voucher
//!
//! The first failing stage aborts the run. Only the mailbox is retried.

mod config;
mod runner;
mod types;

pub use config::AcquisitionConfig;
pub use runner::AcquisitionOrchestrator;
pub use types::{AcquiredVoucher, AcquisitionError, Stage};
