//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokenpair_core::auth::AuthError;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Malformed(_) => AppError::Validation(e.to_string()),
            AuthError::Expired | AuthError::Mismatched | AuthError::Unauthorized => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::NotFound(msg) => AppError::NotFound(msg),
            AuthError::Notification(_) | AuthError::DbError(_) | AuthError::Internal(_) => {
                error!(error = %e, "request failed");
                AppError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_status_codes() {
        let cases = [
            (AuthError::Malformed("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::Expired, StatusCode::UNAUTHORIZED),
            (AuthError::Mismatched, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::NotFound("user 1".into()), StatusCode::NOT_FOUND),
            (AuthError::Notification("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn internal_message_is_opaque() {
        let err = AppError::from(AuthError::Internal("pool exhausted".into()));
        let AppError::Internal(detail) = &err else {
            panic!("expected internal error");
        };
        assert!(detail.contains("pool exhausted"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
