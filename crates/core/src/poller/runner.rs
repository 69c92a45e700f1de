//! Retry poller implementation.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::delay::{Delay, TokioDelay};
use super::types::{PollError, PollOutcome, RetryPolicy};

/// Repeatedly samples an asynchronous operation under a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryPoller {
    policy: RetryPolicy,
    delay: Arc<dyn Delay>,
}

impl std::fmt::Debug for RetryPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPoller")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryPoller {
    /// Create a poller that waits on the tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            delay: Arc::new(TokioDelay),
        }
    }

    /// Replace the wait primitive.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `op` until `is_valid` accepts its result or the budget is spent.
    ///
    /// `op` receives the 1-based attempt number. Attempt `n + 1` starts only
    /// after attempt `n` has been evaluated and the interval has elapsed.
    /// An `Err` from `op` ends polling at once; unsatisfied `Ok` results are
    /// the only thing retried.
    pub async fn poll<T, E, F, Fut, V>(
        &self,
        mut op: F,
        is_valid: V,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome<T>, PollError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        V: Fn(&T) -> bool,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(PollError::Cancelled { attempts: attempt });
            }
            attempt += 1;
            debug!("Poll attempt {}/{}", attempt, max_attempts);

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(PollError::Cancelled { attempts: attempt });
                }
                result = op(attempt) => result,
            };
            let value = result.map_err(|source| PollError::Operation { attempt, source })?;

            if is_valid(&value) {
                debug!("Poll satisfied on attempt {}", attempt);
                return Ok(PollOutcome::Found {
                    value,
                    attempts: attempt,
                });
            }

            if attempt >= max_attempts {
                debug!("Poll exhausted after {} attempts", attempt);
                return Ok(PollOutcome::Exhausted { attempts: attempt });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(PollError::Cancelled { attempts: attempt });
                }
                _ = self.delay.sleep(self.policy.interval()) => {}
            }
        }
    }
}
