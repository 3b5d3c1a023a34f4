//! Tool discovery and invocation handlers.
//!
//! Invocation always answers 200 with an [`InvocationResult`]; failures are
//! carried inside the envelope. Confirmation-gated operations hold the
//! request open until the session's owner resolves the pending confirmation
//! or the dispatcher's timeout declines it.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use webmcp_tools::{InvocationError, InvocationRequest, InvocationResult, OperationDescriptor};

use crate::error::{AppError, Result};
use crate::middleware::ShopSession;
use crate::state::AppState;

/// Body of an invoke request. An empty body means no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct InvokeBody {
    #[serde(default)]
    pub arguments: Value,
}

/// List every registered operation.
pub async fn index(State(state): State<AppState>) -> Json<Vec<OperationDescriptor>> {
    Json(state.dispatcher().list_operations().to_vec())
}

/// Describe one operation.
pub async fn show(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<OperationDescriptor>> {
    state
        .dispatcher()
        .describe(&name)
        .map(|descriptor| Json(descriptor.clone()))
        .map_err(|_| AppError::OperationNotFound(name))
}

/// Invoke an operation on behalf of the caller's session.
#[instrument(skip(state, session, body), fields(tool_name = %name))]
pub async fn invoke(
    State(state): State<AppState>,
    ShopSession(session): ShopSession,
    Path(name): Path<String>,
    body: Bytes,
) -> Json<InvocationResult> {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(err) => return Json(err.into()),
    };

    let request = InvocationRequest::new(name, body.arguments);
    let result = state
        .dispatcher()
        .invoke(&request, &session, state.confirmations())
        .await;
    Json(result)
}

fn parse_body(body: &[u8]) -> std::result::Result<InvokeBody, InvocationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InvokeBody::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| InvocationError::invalid("arguments", format!("malformed JSON body: {e}")))
}
