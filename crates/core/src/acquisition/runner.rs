//! Acquisition orchestrator implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditHandle};
use crate::identity::{Identity, IdentityGenerator};
use crate::metrics::{
    observe_external_call, ACQUISITION_DURATION, ACQUISITION_RUNS, STAGE_FAILURES,
    VERIFICATION_POLL_ATTEMPTS,
};
use crate::poller::{Delay, PollError, PollOutcome, PollerError, RetryPoller};
use crate::services::{
    AccountApi, DeviceId, FuelQuote, FuelType, LockInTerms, Mailbox, PriceSource,
    VerificationCode, VerifiedAccount, VoucherApi, VoucherLock,
};

use super::config::AcquisitionConfig;
use super::types::{AcquiredVoucher, AcquisitionError, Stage};

/// Per-run state. Nothing here is shared between runs.
struct Run<'a> {
    id: String,
    device: DeviceId,
    identity: Identity,
    fuel_type: FuelType,
    cancel: &'a CancellationToken,
}

/// Drives one voucher acquisition per call through the five workflow stages.
///
/// Collaborators are shared and immutable, so any number of runs may execute
/// concurrently on the same orchestrator.
pub struct AcquisitionOrchestrator {
    config: AcquisitionConfig,
    poller: RetryPoller,
    identities: Arc<dyn IdentityGenerator>,
    accounts: Arc<dyn AccountApi>,
    prices: Arc<dyn PriceSource>,
    mailbox: Arc<dyn Mailbox>,
    vouchers: Arc<dyn VoucherApi>,
    audit: Option<AuditHandle>,
}

impl AcquisitionOrchestrator {
    /// Create a new orchestrator.
    ///
    /// Fails if the configured polling budget is empty.
    pub fn new(
        config: AcquisitionConfig,
        identities: Arc<dyn IdentityGenerator>,
        accounts: Arc<dyn AccountApi>,
        prices: Arc<dyn PriceSource>,
        mailbox: Arc<dyn Mailbox>,
        vouchers: Arc<dyn VoucherApi>,
    ) -> Result<Self, PollerError> {
        let poller = RetryPoller::new(config.retry_policy()?);

        Ok(Self {
            config,
            poller,
            identities,
            accounts,
            prices,
            mailbox,
            vouchers,
            audit: None,
        })
    }

    /// Replace the wait used between mailbox polls.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.poller = self.poller.with_delay(delay);
        self
    }

    /// Report workflow events to an audit channel.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Acquire a voucher for `fuel_type`.
    pub async fn acquire_voucher(
        &self,
        fuel_type: FuelType,
    ) -> Result<AcquiredVoucher, AcquisitionError> {
        self.acquire_voucher_with_cancel(fuel_type, &CancellationToken::new())
            .await
    }

    /// Acquire a voucher, aborting with [`AcquisitionError::Cancelled`] once
    /// `cancel` fires.
    pub async fn acquire_voucher_with_cancel(
        &self,
        fuel_type: FuelType,
        cancel: &CancellationToken,
    ) -> Result<AcquiredVoucher, AcquisitionError> {
        let started = Instant::now();
        let run = Run {
            id: Uuid::new_v4().to_string(),
            device: DeviceId::generate(),
            identity: self.identities.generate(),
            fuel_type,
            cancel,
        };

        info!(
            run_id = %run.id,
            fuel_type = %fuel_type,
            email = %run.identity.email,
            "Starting voucher acquisition"
        );
        self.emit(AuditEvent::AcquisitionStarted {
            run_id: run.id.clone(),
            fuel_type,
            email: run.identity.email.clone(),
        })
        .await;

        let result = self.run_stages(&run).await;
        let elapsed = started.elapsed();

        match result {
            Ok(voucher) => {
                info!(
                    run_id = %run.id,
                    voucher = %voucher.code,
                    duration_ms = elapsed.as_millis() as u64,
                    "Voucher acquired"
                );
                ACQUISITION_RUNS.with_label_values(&["success"]).inc();
                ACQUISITION_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed.as_secs_f64());
                self.emit(AuditEvent::AcquisitionCompleted {
                    run_id: run.id.clone(),
                    fuel_type,
                    voucher_code: voucher.code.clone(),
                    duration_ms: millis(elapsed),
                })
                .await;

                Ok(AcquiredVoucher {
                    identity: run.identity.credentials(),
                    run_id: run.id,
                    voucher,
                })
            }
            Err(e) => {
                let label = if e.is_cancelled() { "cancelled" } else { "failed" };
                warn!(
                    run_id = %run.id,
                    stage = %e.stage(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Voucher acquisition failed: {}",
                    e
                );
                ACQUISITION_RUNS.with_label_values(&[label]).inc();
                ACQUISITION_DURATION
                    .with_label_values(&[label])
                    .observe(elapsed.as_secs_f64());
                STAGE_FAILURES.with_label_values(&[e.stage().as_str()]).inc();
                self.emit(AuditEvent::AcquisitionFailed {
                    run_id: run.id.clone(),
                    stage: e.stage(),
                    reason: e.to_string(),
                    duration_ms: millis(elapsed),
                })
                .await;

                Err(e)
            }
        }
    }

    async fn run_stages(&self, run: &Run<'_>) -> Result<VoucherLock, AcquisitionError> {
        self.stage(run, Stage::Registering, self.register(run))
            .await?;
        let quote = self
            .stage(run, Stage::PriceLookup, self.lookup_price(run))
            .await?;
        let code = self
            .stage(run, Stage::AwaitingCode, self.await_code(run))
            .await?;
        let account = self
            .stage(run, Stage::Verifying, self.verify(run, &code))
            .await?;
        self.stage(run, Stage::LockingIn, self.lock_in(run, &account, &quote))
            .await
    }

    /// Run one stage, racing it against cancellation and reporting entry
    /// and completion.
    async fn stage<T, F>(&self, run: &Run<'_>, stage: Stage, work: F) -> Result<T, AcquisitionError>
    where
        F: Future<Output = Result<T, AcquisitionError>>,
    {
        if run.cancel.is_cancelled() {
            return Err(AcquisitionError::Cancelled(stage));
        }

        debug!(run_id = %run.id, stage = %stage, "Entering stage");
        self.emit(AuditEvent::StageEntered {
            run_id: run.id.clone(),
            stage,
        })
        .await;

        let started = Instant::now();
        let result = tokio::select! {
            biased;
            _ = run.cancel.cancelled() => Err(AcquisitionError::Cancelled(stage)),
            result = work => result,
        };

        if result.is_ok() {
            self.emit(AuditEvent::StageCompleted {
                run_id: run.id.clone(),
                stage,
                duration_ms: millis(started.elapsed()),
            })
            .await;
        }
        result
    }

    async fn register(&self, run: &Run<'_>) -> Result<(), AcquisitionError> {
        let started = Instant::now();
        let result = self.accounts.register(&run.device, &run.identity).await;
        observe_external_call("accounts", "register", started, result.is_ok());

        match result {
            Ok(true) => Ok(()),
            Ok(false) => Err(AcquisitionError::RegistrationRejected),
            Err(source) => Err(AcquisitionError::Transport {
                stage: Stage::Registering,
                source,
            }),
        }
    }

    async fn lookup_price(&self, run: &Run<'_>) -> Result<FuelQuote, AcquisitionError> {
        let started = Instant::now();
        let result = self.prices.fuel_prices().await;
        observe_external_call("fuel_prices", "fuel_prices", started, result.is_ok());

        let mut prices = result.map_err(|source| AcquisitionError::Transport {
            stage: Stage::PriceLookup,
            source,
        })?;
        let quote = prices
            .remove(&run.fuel_type)
            .ok_or(AcquisitionError::FuelTypeUnavailable(run.fuel_type))?;

        debug!(
            run_id = %run.id,
            fuel_type = %quote.fuel_type,
            price = quote.price,
            "Selected fuel quote"
        );
        Ok(quote)
    }

    async fn await_code(&self, run: &Run<'_>) -> Result<VerificationCode, AcquisitionError> {
        let mailbox = &self.mailbox;
        let email = run.identity.email.as_str();
        let max_attempts = self.poller.policy().max_attempts();

        let op = |attempt: u32| async move {
            let started = Instant::now();
            let result = mailbox.find_verification_code(email).await;
            observe_external_call("mailbox", "find_verification_code", started, result.is_ok());

            if let Ok(code) = &result {
                self.emit(AuditEvent::VerificationPollAttempt {
                    run_id: run.id.clone(),
                    attempt,
                    max_attempts,
                    found: code.as_ref().is_some_and(|c| !c.is_empty()),
                })
                .await;
            }
            result
        };
        let is_valid = |code: &Option<VerificationCode>| code.as_ref().is_some_and(|c| !c.is_empty());

        match self.poller.poll(op, is_valid, run.cancel).await {
            Ok(PollOutcome::Found { value, attempts }) => {
                VERIFICATION_POLL_ATTEMPTS
                    .with_label_values(&["found"])
                    .observe(attempts as f64);
                debug!(run_id = %run.id, attempts, "Verification code received");
                value.ok_or(AcquisitionError::PollExhausted { attempts })
            }
            Ok(PollOutcome::Exhausted { attempts }) => {
                VERIFICATION_POLL_ATTEMPTS
                    .with_label_values(&["exhausted"])
                    .observe(attempts as f64);
                Err(AcquisitionError::PollExhausted { attempts })
            }
            Err(PollError::Operation { attempt, source }) => {
                VERIFICATION_POLL_ATTEMPTS
                    .with_label_values(&["error"])
                    .observe(attempt as f64);
                Err(AcquisitionError::Transport {
                    stage: Stage::AwaitingCode,
                    source,
                })
            }
            Err(PollError::Cancelled { .. }) => Err(AcquisitionError::Cancelled(Stage::AwaitingCode)),
        }
    }

    async fn verify(
        &self,
        run: &Run<'_>,
        code: &VerificationCode,
    ) -> Result<VerifiedAccount, AcquisitionError> {
        let started = Instant::now();
        let result = self.accounts.verify(&run.device, code).await;
        observe_external_call("accounts", "verify", started, result.is_ok());

        result.map_err(AcquisitionError::VerificationRejected)
    }

    async fn lock_in(
        &self,
        run: &Run<'_>,
        account: &VerifiedAccount,
        quote: &FuelQuote,
    ) -> Result<VoucherLock, AcquisitionError> {
        let terms = LockInTerms {
            fuel_type: run.fuel_type,
            litres: self.config.lock_in_litres,
            lat: quote.lat,
            lng: quote.lng,
        };

        let started = Instant::now();
        let result = self.vouchers.lock_in(&run.device, account, &terms).await;
        observe_external_call("vouchers", "lock_in", started, result.is_ok());

        match result {
            Ok(Some(voucher)) => Ok(voucher),
            Ok(None) => Err(AcquisitionError::LockInRejected),
            Err(source) => Err(AcquisitionError::Transport {
                stage: Stage::LockingIn,
                source,
            }),
        }
    }

    async fn emit(&self, event: AuditEvent) {
        if let Some(ref audit) = self.audit {
            audit.emit(event).await;
        }
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
