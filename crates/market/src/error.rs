//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures upstream failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::chain::ChainError;
use crate::encryption::EncryptionError;
use crate::storage::StorageError;

/// Application-level error type for the market service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Contract interaction failed.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Pinning gateway interaction failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Encryption network interaction failed.
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    /// Whether this error is ours/upstream rather than the client's.
    fn is_server_side(&self) -> bool {
        let status = self.status();
        status != StatusCode::BAD_REQUEST
            && status != StatusCode::NOT_FOUND
            && status != StatusCode::CONFLICT
    }

    /// Map the error to a response status.
    fn status(&self) -> StatusCode {
        match self {
            Self::Chain(err) => match err {
                ChainError::NotFound(_) => StatusCode::NOT_FOUND,
                ChainError::Page(_) | ChainError::Conversion(_) => StatusCode::BAD_REQUEST,
                ChainError::Inactive(_) => StatusCode::CONFLICT,
                ChainError::NoSigner => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Storage(err) => match err {
                StorageError::InvalidCid(_) | StorageError::EmptyFile => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Encryption(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side errors to Sentry
        if self.is_server_side() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose upstream/internal detail to clients
        let message = if matches!(self, Self::Internal(_)) {
            "Internal server error".to_string()
        } else if matches!(self, Self::Chain(ChainError::NoSigner)) {
            "This deployment has no operator wallet configured".to_string()
        } else if status == StatusCode::BAD_GATEWAY {
            "External service error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ddm_core::ListingId;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("listing 12".to_string());
        assert_eq!(err.to_string(), "Not found: listing 12");

        let err = AppError::BadRequest("invalid address".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid address");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Chain(ChainError::NotFound(ListingId::new(7))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Chain(ChainError::NoSigner).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Chain(ChainError::Inactive(ListingId::new(7))).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Storage(StorageError::InvalidCid("nope".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Encryption(EncryptionError::HashMismatch).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_errors_not_reported() {
        assert!(!AppError::BadRequest("x".to_string()).is_server_side());
        assert!(!AppError::NotFound("x".to_string()).is_server_side());
        assert!(AppError::Internal("x".to_string()).is_server_side());
        assert!(AppError::Encryption(EncryptionError::HashMismatch).is_server_side());
    }
}
