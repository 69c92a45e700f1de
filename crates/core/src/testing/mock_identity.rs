//! Deterministic identity generator for testing.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::identity::{Identity, IdentityGenerator};

use super::fixtures;

/// Yields `user1@1secmail.com`, `user2@1secmail.com`, ... so each run gets a
/// distinct but predictable identity.
#[derive(Debug, Default)]
pub struct MockIdentityGenerator {
    counter: AtomicU32,
}

impl MockIdentityGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities handed out.
    pub fn generated(&self) -> u32 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl IdentityGenerator for MockIdentityGenerator {
    fn generate(&self) -> Identity {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        fixtures::identity(&format!("user{}@1secmail.com", n))
    }
}
