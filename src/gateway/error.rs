//! API error type.
//!
//! Every failure leaves the service as `{"error": "<message>"}` with a status
//! from a small fixed set. Unexpected failures are logged here and collapse to
//! a generic 500 so no database or I/O detail reaches the caller.

use axum::Json;
use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// 401: no usable credentials were presented
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// 403: session token failed signature or expiry check
    #[error("Invalid or expired token")]
    InvalidToken,

    /// 403: authenticated but not allowed
    #[error("{0}")]
    Forbidden(&'static str),

    /// 404
    #[error("{0}")]
    NotFound(String),

    /// 413: body exceeds the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// 409: uniqueness or reference conflict
    #[error("{0}")]
    Conflict(String),

    /// 400: password reset token does not exist
    #[error("Invalid reset token")]
    InvalidResetToken,

    /// 400: password reset token already consumed or past its window
    #[error("Reset token is expired or already used")]
    ExpiredOrUsed,

    /// 500: details are logged, never returned
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Log an unexpected failure and hide it behind a 500.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        Self::Internal
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidResetToken | Self::ExpiredOrUsed => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                tracing::warn!("Unique constraint rejected write: {}", db_err);
                return Self::Conflict("Resource already exists".to_string());
            }
            if db_err.is_foreign_key_violation() {
                tracing::warn!("Foreign key constraint rejected write: {}", db_err);
                return Self::Conflict(
                    "Referenced resource does not exist or is still in use".to_string(),
                );
            }
        }
        Self::internal("Database error", err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("Unexpected failure", format!("{:#}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        Self::Validation(format!("Invalid or missing fields: {}", fields.join(", ")))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::Validation(format!("Invalid JSON: {}", rejection.body_text()))
    }
}

/// JSON response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.http_status(), Json(body)).into_response()
    }
}
