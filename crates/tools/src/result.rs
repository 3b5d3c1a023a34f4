//! Normalized result envelope returned to the calling agent.
//!
//! On the wire a result is either
//! `{"ok": true, "content": [{"type": "text", "text": "..."}]}` or
//! `{"ok": false, "error_message": "...", "error_kind": "not_found"}`.

use serde::{Deserialize, Serialize};

use crate::error::InvocationError;

/// A display block in a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content.
    Text {
        /// The text content.
        text: String,
    },
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The block's text.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// Machine-readable failure tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    OperationNotFound,
    InvalidArguments,
    Cancelled,
    NotFound,
    CollaboratorFailure,
}

/// Outcome of exactly one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResultEnvelope", try_from = "ResultEnvelope")]
pub enum InvocationResult {
    /// The operation completed.
    Success {
        /// Ordered display blocks.
        content: Vec<ContentBlock>,
    },
    /// The operation did not complete.
    Failure {
        /// Failure tag.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}

impl InvocationResult {
    /// A successful result.
    #[must_use]
    pub const fn success(content: Vec<ContentBlock>) -> Self {
        Self::Success { content }
    }

    /// A failed result.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Whether the invocation succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Content blocks of a successful result (empty on failure).
    #[must_use]
    pub fn content(&self) -> &[ContentBlock] {
        match self {
            Self::Success { content } => content,
            Self::Failure { .. } => &[],
        }
    }

    /// Error message of a failed result.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }

    /// Error tag of a failed result.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// All text blocks joined with blank lines.
    #[must_use]
    pub fn text(&self) -> String {
        self.content()
            .iter()
            .map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl From<InvocationError> for InvocationResult {
    fn from(err: InvocationError) -> Self {
        Self::failure(err.kind(), err.to_string())
    }
}

/// Flat wire representation of [`InvocationResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResultEnvelope {
    ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
}

impl From<InvocationResult> for ResultEnvelope {
    fn from(result: InvocationResult) -> Self {
        match result {
            InvocationResult::Success { content } => Self {
                ok: true,
                content,
                error_message: None,
                error_kind: None,
            },
            InvocationResult::Failure { kind, message } => Self {
                ok: false,
                content: Vec::new(),
                error_message: Some(message),
                error_kind: Some(kind),
            },
        }
    }
}

impl TryFrom<ResultEnvelope> for InvocationResult {
    type Error = String;

    fn try_from(envelope: ResultEnvelope) -> Result<Self, Self::Error> {
        if envelope.ok {
            return Ok(Self::Success {
                content: envelope.content,
            });
        }
        let message = envelope
            .error_message
            .ok_or_else(|| "failed result without error_message".to_string())?;
        Ok(Self::Failure {
            kind: envelope.error_kind.unwrap_or(ErrorKind::CollaboratorFailure),
            message,
        })
    }
}

/// Build the standard success content: a human-readable summary followed by
/// the machine-readable payload as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`InvocationError::CollaboratorFailure`] if the payload cannot be
/// serialized.
pub fn summary_with_payload<T: Serialize>(
    summary: impl Into<String>,
    payload: &T,
) -> Result<Vec<ContentBlock>, InvocationError> {
    let json = serde_json::to_string_pretty(payload).map_err(|e| {
        InvocationError::CollaboratorFailure(format!("failed to serialize payload: {e}"))
    })?;
    Ok(vec![ContentBlock::text(summary), ContentBlock::text(json)])
}
