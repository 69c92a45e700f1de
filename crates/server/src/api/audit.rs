use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use fuelock_core::{AuditFilter, AuditRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ErrorResponse;
use crate::state::AppState;

/// Maximum allowed limit for audit queries
const MAX_LIMIT: usize = 1000;

/// Default limit for audit queries
const DEFAULT_LIMIT: usize = 100;

/// Query parameters for audit endpoint
#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    /// Filter by acquisition run
    pub run_id: Option<String>,
    /// Filter by event type
    pub event_type: Option<String>,
    /// Maximum number of events to return (default 100, max 1000)
    pub limit: Option<usize>,
}

/// Response for audit query endpoint
#[derive(Debug, Serialize)]
pub struct AuditQueryResponse {
    /// Most recent matching events, oldest first
    pub events: Vec<AuditRecord>,
    /// Limit used for this query
    pub limit: usize,
}

/// Query audit events
pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditQueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let mut filter = AuditFilter::new().with_limit(limit);
    if let Some(run_id) = params.run_id {
        filter = filter.with_run_id(run_id);
    }
    if let Some(event_type) = params.event_type {
        filter = filter.with_event_type(event_type);
    }

    let events = state.audit_store().query(&filter).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!(
                "Failed to query audit events: {}",
                e
            ))),
        )
    })?;

    Ok(Json(AuditQueryResponse { events, limit }))
}
