//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Acquisition runs (results, durations, failing stages)
//! - Verification code polling
//! - External services (accounts, fuel prices, mailbox)

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Acquisition Metrics
// =============================================================================

/// Acquisition runs total by result.
pub static ACQUISITION_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fuelock_acquisition_runs_total", "Total acquisition runs"),
        &["result"], // "success", "failed", "cancelled"
    )
    .unwrap()
});

/// Acquisition duration in seconds.
pub static ACQUISITION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fuelock_acquisition_duration_seconds",
            "Duration of a full acquisition run",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

/// Failed runs by the stage that failed.
pub static STAGE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fuelock_stage_failures_total",
            "Acquisition failures by workflow stage",
        ),
        &["stage"],
    )
    .unwrap()
});

/// Mailbox polls needed per run.
pub static VERIFICATION_POLL_ATTEMPTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fuelock_verification_poll_attempts",
            "Mailbox polls performed while waiting for a verification code",
        )
        .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 7.0, 10.0, 15.0, 20.0]),
        &["result"], // "found", "exhausted", "error"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "fuelock_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fuelock_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one external call started at `started`.
pub fn observe_external_call(service: &str, operation: &str, started: Instant, success: bool) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(started.elapsed().as_secs_f64());
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, if success { "success" } else { "error" }])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Acquisition
        Box::new(ACQUISITION_RUNS.clone()),
        Box::new(ACQUISITION_DURATION.clone()),
        Box::new(STAGE_FAILURES.clone()),
        Box::new(VERIFICATION_POLL_ATTEMPTS.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_without_conflicts() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }

    #[test]
    fn test_observe_external_call_counts_status() {
        let before = EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["unit", "probe", "error"])
            .get();
        observe_external_call("unit", "probe", Instant::now(), false);
        let after = EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["unit", "probe", "error"])
            .get();
        assert_eq!(after, before + 1);
    }
}
