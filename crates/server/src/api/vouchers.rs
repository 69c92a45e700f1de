use axum::{extract::State, http::StatusCode, Json};
use fuelock_core::{AcquiredVoucher, AcquisitionError, FuelType, Stage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// Request body for a voucher acquisition.
#[derive(Debug, Deserialize)]
pub struct AcquireVoucherRequest {
    /// Fuel name, e.g. "U91", "e10", "unleaded"
    pub fuel_type: String,
}

/// Error body for a failed acquisition.
#[derive(Debug, Serialize)]
pub struct VoucherErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

type ErrorReply = (StatusCode, Json<VoucherErrorResponse>);

/// Run one acquisition and return the locked voucher.
///
/// The run is cancelled if the client disconnects or the server shuts down.
pub async fn acquire_voucher(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AcquireVoucherRequest>,
) -> Result<(StatusCode, Json<AcquiredVoucher>), ErrorReply> {
    let fuel_type: FuelType = request.fuel_type.parse().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(VoucherErrorResponse {
                error: format!("{}", e),
                stage: None,
            }),
        )
    })?;

    // The run lives on its own task so it can observe cancellation and record
    // its failure. Dropping the request future drops the guard, which cancels
    // the run.
    let cancel = state.shutdown().child_token();
    let _guard = cancel.clone().drop_guard();
    let orchestrator = state.orchestrator_handle();
    let run = tokio::spawn(async move {
        orchestrator
            .acquire_voucher_with_cancel(fuel_type, &cancel)
            .await
    });

    match run.await {
        Ok(Ok(acquired)) => Ok((StatusCode::CREATED, Json(acquired))),
        Ok(Err(e)) => Err((
            error_status(&e),
            Json(VoucherErrorResponse {
                error: e.to_string(),
                stage: Some(e.stage()),
            }),
        )),
        Err(e) => {
            tracing::error!("Acquisition task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VoucherErrorResponse {
                    error: "acquisition task failed".to_string(),
                    stage: None,
                }),
            ))
        }
    }
}

/// HTTP status for a failed run.
pub fn error_status(error: &AcquisitionError) -> StatusCode {
    match error {
        AcquisitionError::FuelTypeUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AcquisitionError::PollExhausted { .. } => StatusCode::GATEWAY_TIMEOUT,
        AcquisitionError::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
        AcquisitionError::RegistrationRejected
        | AcquisitionError::VerificationRejected(_)
        | AcquisitionError::LockInRejected
        | AcquisitionError::Transport { .. } => StatusCode::BAD_GATEWAY,
    }
}
