//! Bounded polling of an asynchronous source.
//!
//! The poller repeatedly samples a caller-supplied operation until its result
//! satisfies a validity predicate or the attempt budget runs out:
//! - Attempts are strictly sequential, each one a fresh call
//! - A fixed delay separates consecutive attempts (no backoff, no jitter)
//! - Exhaustion is reported as [`PollOutcome::Exhausted`], not as an error
//! - Operation faults and cancellation abort polling immediately

mod delay;
mod runner;
mod types;

pub use delay::{Delay, TokioDelay};
pub use runner::RetryPoller;
pub use types::{PollError, PollOutcome, PollerError, RetryPolicy};
