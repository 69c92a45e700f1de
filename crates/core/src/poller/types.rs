//! Types for the retry poller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a poller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollerError {
    /// The policy would never invoke the operation.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Errors that abort a poll before it reaches an outcome.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The operation itself failed. Faults are not retried.
    #[error("poll operation failed on attempt {attempt}: {source}")]
    Operation { attempt: u32, source: E },

    /// The cancellation token fired.
    #[error("polling cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

/// Attempt budget and fixed inter-attempt delay for one polling operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRetryPolicy")]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

/// Unchecked wire form; deserialization goes through [`RetryPolicy::new`].
#[derive(Deserialize)]
struct RawRetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl TryFrom<RawRetryPolicy> for RetryPolicy {
    type Error = PollerError;

    fn try_from(raw: RawRetryPolicy) -> Result<Self, Self::Error> {
        Self::new(raw.max_attempts, raw.interval)
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` must be at least 1.
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self, PollerError> {
        if max_attempts == 0 {
            return Err(PollerError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    /// Create a policy with the interval given in milliseconds.
    pub fn from_millis(max_attempts: u32, interval_ms: u64) -> Result<Self, PollerError> {
        Self::new(max_attempts, Duration::from_millis(interval_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Upper bound on the time spent waiting between attempts.
    pub fn max_total_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Result of a completed poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// A result satisfied the predicate after `attempts` invocations.
    Found { value: T, attempts: u32 },
    /// Every permitted attempt produced an unsatisfied result.
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, PollOutcome::Found { .. })
    }

    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Found { attempts, .. } | PollOutcome::Exhausted { attempts } => *attempts,
        }
    }

    /// Discard the attempt count, keeping only the found value.
    pub fn into_option(self) -> Option<T> {
        match self {
            PollOutcome::Found { value, .. } => Some(value),
            PollOutcome::Exhausted { .. } => None,
        }
    }
}
