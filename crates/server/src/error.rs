//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Errors render as a JSON
//! [`ErrorBody`] with an HTTP status; server-side failures are captured to
//! Sentry before responding.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;
use webmcp_tools::CommerceError;
use webmcp_tools::rest::{ErrorBody, codes};

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce backend call failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// No operation with this name.
    #[error("operation not found: {0}")]
    OperationNotFound(String),

    /// No pending confirmation with this id for the caller's session.
    #[error("confirmation {0} not found or expired")]
    ConfirmationNotFound(Uuid),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Commerce(CommerceError::NotFound { entity, .. }) => {
                let code = if *entity == "product" {
                    codes::PRODUCT_NOT_FOUND
                } else {
                    codes::CART_ITEM_NOT_FOUND
                };
                (StatusCode::NOT_FOUND, code)
            }
            Self::Commerce(CommerceError::Rejected(_)) => (StatusCode::BAD_REQUEST, codes::CART_ERROR),
            Self::Commerce(CommerceError::Unavailable(_) | CommerceError::Decode(_))
            | Self::Session(_)
            | Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR),
            Self::OperationNotFound(_) => (StatusCode::NOT_FOUND, codes::OPERATION_NOT_FOUND),
            Self::ConfirmationNotFound(_) => {
                (StatusCode::NOT_FOUND, codes::CONFIRMATION_NOT_FOUND)
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, codes::BAD_REQUEST),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Capture server errors to Sentry
        let message = if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            // Don't expose internal error details to clients
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_codes_follow_entity() {
        let err = AppError::from(CommerceError::product_not_found(7));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::NOT_FOUND, codes::PRODUCT_NOT_FOUND)
        );

        let err = AppError::from(CommerceError::cart_item_not_found("abc"));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::NOT_FOUND, codes::CART_ITEM_NOT_FOUND)
        );
    }

    #[test]
    fn test_rejected_is_bad_request() {
        let err = AppError::from(CommerceError::Rejected("out of stock".into()));
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, codes::CART_ERROR));
        assert_eq!(err.to_string(), "out of stock");
    }

    #[test]
    fn test_internal_details_hidden() {
        let response = AppError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
