//! Per-invocation calling context.

use webmcp_core::SessionId;

/// Identifies the session an invocation acts on behalf of.
///
/// Passed explicitly to every invocation; the cart an operation reads or
/// mutates is the one bound to this session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionContext {
    pub session_id: SessionId,
}

impl SessionContext {
    #[must_use]
    pub const fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}
