//! Injectable wait primitive used between poll attempts.

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the calling task for a duration.
///
/// Production code uses [`TokioDelay`]; tests inject a recording
/// implementation so attempt budgets can be asserted without wall-clock waits.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Delay backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
