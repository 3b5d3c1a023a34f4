//! Error types for operation invocation and commerce collaborators.

use thiserror::Error;

use crate::result::ErrorKind;

/// Errors that can end an invocation.
///
/// Every variant maps onto one [`ErrorKind`] tag in the result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// No operation is registered under the requested name.
    #[error("operation not found: {0}")]
    OperationNotFound(String),

    /// An argument failed schema validation.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArguments {
        /// Offending field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The user declined or abandoned the confirmation.
    #[error("cancelled by user")]
    Cancelled,

    /// A referenced entity (product, cart line) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The commerce backend failed or rejected the call.
    #[error("commerce backend error: {0}")]
    CollaboratorFailure(String),
}

impl InvocationError {
    /// Shorthand for an [`InvocationError::InvalidArguments`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable tag for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::OperationNotFound(_) => ErrorKind::OperationNotFound,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::CollaboratorFailure(_) => ErrorKind::CollaboratorFailure,
        }
    }
}

/// Errors returned by a [`CommerceAdapter`](crate::adapter::CommerceAdapter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommerceError {
    /// The entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind ("product", "cart item").
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The backend refused the request (out of stock, invalid quantity).
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("commerce backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something we could not interpret.
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl CommerceError {
    /// A missing product.
    pub fn product_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "product",
            id: id.to_string(),
        }
    }

    /// A missing cart line.
    pub fn cart_item_not_found(key: impl ToString) -> Self {
        Self::NotFound {
            entity: "cart item",
            id: key.to_string(),
        }
    }
}

impl From<CommerceError> for InvocationError {
    fn from(err: CommerceError) -> Self {
        match err {
            CommerceError::NotFound { .. } => Self::NotFound(err.to_string()),
            CommerceError::Rejected(_)
            | CommerceError::Unavailable(_)
            | CommerceError::Decode(_) => Self::CollaboratorFailure(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for CommerceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_error_display() {
        let err = InvocationError::invalid("quantity", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid argument 'quantity': must be at least 1"
        );
        assert_eq!(InvocationError::Cancelled.to_string(), "cancelled by user");
    }

    #[test]
    fn test_commerce_not_found_maps_to_not_found() {
        let err: InvocationError = CommerceError::product_not_found(999).into();
        assert_eq!(err, InvocationError::NotFound("product 999 not found".to_string()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_commerce_failures_map_to_collaborator_failure() {
        let err: InvocationError = CommerceError::Unavailable("connection refused".into()).into();
        assert_eq!(err.kind(), ErrorKind::CollaboratorFailure);
        assert!(err.to_string().contains("connection refused"));

        let err: InvocationError = CommerceError::Rejected("out of stock".into()).into();
        assert_eq!(err.kind(), ErrorKind::CollaboratorFailure);
    }
}
