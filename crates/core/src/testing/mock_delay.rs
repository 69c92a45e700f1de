//! Delay that records requested waits instead of sleeping.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::poller::Delay;

/// [`Delay`] that returns immediately and remembers every duration it was
/// asked to wait.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waits requested so far.
    pub fn count(&self) -> usize {
        self.waits.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Every requested wait, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.waits.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
        tokio::task::yield_now().await;
    }
}
