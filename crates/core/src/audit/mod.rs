//! Structured workflow events.
//!
//! The orchestrator reports every stage transition and poll attempt through
//! an [`AuditHandle`]. A background [`AuditWriter`] drains the channel into an
//! [`AuditStore`]; the shipped store keeps a bounded in-memory history.

mod events;
mod handle;
mod memory;
mod store;
mod writer;

pub use events::*;
pub use handle::*;
pub use memory::*;
pub use store::*;
pub use writer::*;

use serde::{Deserialize, Serialize};

/// Audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Number of events kept in memory (default: 1000).
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    1000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
