//! Pending confirmation handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webmcp_tools::ConfirmationDecision;

use crate::error::{AppError, Result};
use crate::middleware::ShopSession;
use crate::services::PendingConfirmation;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub confirmations: Vec<PendingConfirmation>,
}

/// Body of a resolve request.
#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub approved: bool,
}

/// Pending confirmations for the caller's session.
pub async fn index(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
) -> Json<PendingResponse> {
    Json(PendingResponse {
        confirmations: state.confirmations().pending_for(&session.session_id),
    })
}

/// Approve or decline a pending confirmation.
pub async fn resolve(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
    Path(id): Path<Uuid>,
    body: std::result::Result<Json<ResolveBody>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(body) = body?;
    let decision = ConfirmationDecision {
        approved: body.approved,
    };

    if state
        .confirmations()
        .resolve(id, &session.session_id, decision)
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::ConfirmationNotFound(id))
    }
}
