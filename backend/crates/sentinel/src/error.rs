//! Sentinel Error Types
//!
//! Store-facing and transport-facing error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! None of these reach the caller of `is_allowed`: the admission
//! use case resolves every variant to a boolean.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Sentinel-specific result type alias
pub type SentinelResult<T> = Result<T, SentinelError>;

#[derive(Debug, Error)]
pub enum SentinelError {
    /// Request parameters outside their domain (capacity <= 0, cost < 1, ...)
    #[error("Invalid request: {0}")]
    InvalidParameter(String),

    /// The store did not answer within the configured deadline
    #[error("Bucket store timed out after {0} ms")]
    StoreTimeout(u64),

    /// The store could not run the atomic operation
    #[error("Bucket store unavailable: {0}")]
    StoreUnavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SentinelError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SentinelError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            SentinelError::StoreTimeout(_)
            | SentinelError::StoreUnavailable(_)
            | SentinelError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SentinelError::InvalidParameter(_) => ErrorKind::BadRequest,
            SentinelError::StoreTimeout(_)
            | SentinelError::StoreUnavailable(_)
            | SentinelError::Database(_) => ErrorKind::ServiceUnavailable,
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            SentinelError::Database(e) => {
                tracing::error!(error = %e, "Bucket store database error");
            }
            SentinelError::StoreUnavailable(msg) => {
                tracing::error!(message = %msg, "Bucket store unavailable");
            }
            SentinelError::StoreTimeout(ms) => {
                tracing::warn!(timeout_ms = ms, "Bucket store timed out");
            }
            SentinelError::InvalidParameter(_) => {
                tracing::debug!(error = %self, "Rejected malformed admission request");
            }
        }
    }
}

impl From<SentinelError> for AppError {
    fn from(err: SentinelError) -> Self {
        match err {
            SentinelError::Database(e) => AppError::from(e),
            SentinelError::InvalidParameter(_) => AppError::bad_request(err.to_string()),
            SentinelError::StoreTimeout(_) | SentinelError::StoreUnavailable(_) => {
                AppError::service_unavailable(err.to_string())
            }
        }
    }
}

impl IntoResponse for SentinelError {
    fn into_response(self) -> Response {
        self.log();
        if self.kind().is_server_error() {
            // Keep store details out of the response body
            return (self.status_code(), ()).into_response();
        }
        AppError::from(self).into_response()
    }
}

impl From<platform::client::IdentifierError> for SentinelError {
    fn from(err: platform::client::IdentifierError) -> Self {
        SentinelError::InvalidParameter(err.to_string())
    }
}
