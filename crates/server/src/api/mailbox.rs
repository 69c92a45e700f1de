//! Disposable mailbox inspection and verification-link follow-up.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use fuelock_core::services::{MailMessage, MailSummary};
use fuelock_core::ServiceError;
use serde::Serialize;
use std::sync::Arc;

use super::ErrorResponse;
use crate::state::AppState;

type ErrorReply = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub email: String,
    pub messages: Vec<MailSummary>,
}

#[derive(Debug, Serialize)]
pub struct VerificationLinkResponse {
    pub email: String,
    /// Whether a link was found and its target accepted the request.
    pub clicked: bool,
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<MessagesResponse>, ErrorReply> {
    let messages = state
        .mailbox()
        .list_messages(&email)
        .await
        .map_err(upstream_error)?;

    Ok(Json(MessagesResponse { email, messages }))
}

pub async fn read_message(
    State(state): State<Arc<AppState>>,
    Path((email, id)): Path<(String, u64)>,
) -> Result<Json<MailMessage>, ErrorReply> {
    match state.mailbox().read_message(&email, id).await {
        Ok(Some(message)) => Ok(Json(message)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Message {} not found", id))),
        )),
        Err(e) => Err(upstream_error(e)),
    }
}

pub async fn click_verification_link(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<VerificationLinkResponse>, ErrorReply> {
    let clicked = state
        .mailbox()
        .click_verification_link(&email)
        .await
        .map_err(upstream_error)?;

    Ok(Json(VerificationLinkResponse { email, clicked }))
}

/// A rejected address is the caller's fault; anything else is upstream.
fn upstream_error(e: ServiceError) -> ErrorReply {
    let status = match e {
        ServiceError::Rejected(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!("Mailbox request failed ({}): {}", status, e);
    (
        status,
        Json(ErrorResponse::new(format!("Mailbox request failed: {}", e))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_status() {
        let (status, _) = upstream_error(ServiceError::Rejected(
            "not a mailbox address: jane".to_string(),
        ));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = upstream_error(ServiceError::ApiError {
            status: 500,
            message: "down".to_string(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.error.contains("down"));
    }
}
