//! Invocation dispatcher.
//!
//! Turns one [`InvocationRequest`] into exactly one [`InvocationResult`]:
//! resolve the operation, validate its arguments, run read-only preparation,
//! ask for confirmation when the operation requires it, then execute.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::confirmation::{ConfirmationDecision, ConfirmationGate, ConfirmationRequest};
use crate::context::SessionContext;
use crate::descriptor::OperationDescriptor;
use crate::error::InvocationError;
use crate::registry::OperationRegistry;
use crate::result::{ContentBlock, InvocationResult};
use crate::schema::Arguments;

/// A call to one named operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub operation: String,
    #[serde(default)]
    pub arguments: Value,
}

impl InvocationRequest {
    pub fn new(operation: impl Into<String>, arguments: Value) -> Self {
        Self {
            operation: operation.into(),
            arguments,
        }
    }
}

/// Outcome of an operation's preparation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preparation {
    /// Continue to confirmation (if required) and execution. `prompt`
    /// overrides the generic confirmation text.
    Proceed { prompt: Option<String> },
    /// Finish without confirming or executing.
    Finished(Vec<ContentBlock>),
}

impl Preparation {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self::Proceed {
            prompt: Some(prompt.into()),
        }
    }
}

/// Procedures behind the registered operations.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Read-only lookups run before confirmation. Errors here end the
    /// invocation without asking the user anything.
    async fn prepare(
        &self,
        _operation: &OperationDescriptor,
        _arguments: &Arguments,
        _session: &SessionContext,
    ) -> Result<Preparation, InvocationError> {
        Ok(Preparation::Proceed { prompt: None })
    }

    /// Run the operation.
    async fn execute(
        &self,
        operation: &OperationDescriptor,
        arguments: &Arguments,
        session: &SessionContext,
    ) -> Result<Vec<ContentBlock>, InvocationError>;
}

/// Routes validated requests to an [`OperationHandler`].
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
    handler: Arc<dyn OperationHandler>,
    confirmation_timeout: Option<Duration>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<OperationRegistry>, handler: Arc<dyn OperationHandler>) -> Self {
        Self {
            registry,
            handler,
            confirmation_timeout: None,
        }
    }

    /// Treat a confirmation that takes longer than `timeout` as declined.
    #[must_use]
    pub const fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// All registered operations.
    #[must_use]
    pub fn list_operations(&self) -> &[OperationDescriptor] {
        self.registry.list()
    }

    /// Describe one operation.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::OperationNotFound`] for unknown names.
    pub fn describe(&self, name: &str) -> Result<&OperationDescriptor, InvocationError> {
        self.registry.describe(name)
    }

    /// Invoke an operation. Never fails: every error is folded into the
    /// returned envelope.
    #[instrument(
        skip(self, request, session, gate),
        fields(operation = %request.operation, session = %session.session_id)
    )]
    pub async fn invoke(
        &self,
        request: &InvocationRequest,
        session: &SessionContext,
        gate: &dyn ConfirmationGate,
    ) -> InvocationResult {
        match self.run(request, session, gate).await {
            Ok(content) => {
                debug!(blocks = content.len(), "Invocation succeeded");
                InvocationResult::success(content)
            }
            Err(err) => {
                log_failure(&err);
                err.into()
            }
        }
    }

    async fn run(
        &self,
        request: &InvocationRequest,
        session: &SessionContext,
        gate: &dyn ConfirmationGate,
    ) -> Result<Vec<ContentBlock>, InvocationError> {
        let descriptor = self.registry.describe(&request.operation)?;
        let arguments = descriptor.input_schema.validate(&request.arguments)?;

        let prompt = match self
            .handler
            .prepare(descriptor, &arguments, session)
            .await?
        {
            Preparation::Finished(content) => return Ok(content),
            Preparation::Proceed { prompt } => prompt,
        };

        if descriptor.requires_confirmation {
            let confirmation = ConfirmationRequest {
                operation: descriptor.name.clone(),
                prompt: prompt.unwrap_or_else(|| default_prompt(descriptor)),
                session_id: session.session_id.clone(),
            };
            if !self.confirm(gate, &confirmation).await.approved {
                return Err(InvocationError::Cancelled);
            }
        }

        self.handler.execute(descriptor, &arguments, session).await
    }

    async fn confirm(
        &self,
        gate: &dyn ConfirmationGate,
        request: &ConfirmationRequest,
    ) -> ConfirmationDecision {
        debug!(prompt = %request.prompt, "Requesting confirmation");
        match self.confirmation_timeout {
            Some(timeout) => tokio::time::timeout(timeout, gate.request_confirmation(request))
                .await
                .unwrap_or_else(|_| {
                    info!(timeout_secs = timeout.as_secs(), "Confirmation timed out");
                    ConfirmationDecision::DECLINED
                }),
            None => gate.request_confirmation(request).await,
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("operations", &self.registry.names())
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish_non_exhaustive()
    }
}

fn default_prompt(descriptor: &OperationDescriptor) -> String {
    format!("Allow {}? {}", descriptor.name, descriptor.description)
}

fn log_failure(err: &InvocationError) {
    match err {
        InvocationError::Cancelled => info!("Invocation cancelled by user"),
        InvocationError::OperationNotFound(_)
        | InvocationError::InvalidArguments { .. }
        | InvocationError::NotFound(_) => warn!(error = %err, "Invocation rejected"),
        InvocationError::CollaboratorFailure(_) => error!(error = %err, "Invocation failed"),
    }
}
