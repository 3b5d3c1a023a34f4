//! Human confirmation gate.
//!
//! Mutating operations suspend on a [`ConfirmationGate`] before they run.
//! A gate that cannot reach a human (closed terminal, dropped HTTP waiter)
//! must answer with a decline; the dispatcher never proceeds without an
//! explicit approval.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use webmcp_core::SessionId;

/// What the human is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationRequest {
    pub operation: String,
    /// Human-readable description of the pending action.
    pub prompt: String,
    pub session_id: SessionId,
}

/// The human's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationDecision {
    pub approved: bool,
}

impl ConfirmationDecision {
    pub const APPROVED: Self = Self { approved: true };
    pub const DECLINED: Self = Self { approved: false };
}

/// Asks a human to approve a pending action.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Request approval. Called at most once per invocation.
    async fn request_confirmation(&self, request: &ConfirmationRequest) -> ConfirmationDecision;
}

/// A gate that always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub ConfirmationDecision);

impl StaticGate {
    #[must_use]
    pub const fn approve() -> Self {
        Self(ConfirmationDecision::APPROVED)
    }

    #[must_use]
    pub const fn decline() -> Self {
        Self(ConfirmationDecision::DECLINED)
    }
}

#[async_trait]
impl ConfirmationGate for StaticGate {
    async fn request_confirmation(&self, _request: &ConfirmationRequest) -> ConfirmationDecision {
        self.0
    }
}
