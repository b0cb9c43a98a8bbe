//! # HTTP Error Type
//!
//! What clients see when a request fails.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the API                                │
//! │                                                                         │
//! │  ValidationError ───────────────────────────► 400 {"error": "<why>"}   │
//! │  extractor rejection (JSON/path/query) ─────► 400 "Invalid request     │
//! │                                                    format"             │
//! │  DbError::NotFound { entity } ──────────────► 404 "<Entity> not found" │
//! │  DbError::InvalidReference / Rule / FK ─────► 400 {"error": "<why>"}   │
//! │  any other DbError ─────────────────────────► 500 fixed message        │
//! │                                                (cause logged only)      │
//! │  deadline exceeded ─────────────────────────► 500 "Request timed out"  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;
use thiserror::Error;

use crate::config::ConfigError;

/// Message used for every malformed request body, path, or query string.
pub const INVALID_REQUEST_FORMAT: &str = "Invalid request format";

/// API error returned from handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The entity does not exist (or is soft-deleted). Message: "Cart not found".
    #[error("{0}")]
    NotFound(String),

    /// The request is malformed or breaks a rule.
    #[error("{0}")]
    Validation(String),

    /// Storage failed. Only `message` reaches the client.
    #[error("{message}")]
    Persistence {
        message: &'static str,
        #[source]
        source: DbError,
    },

    /// The storage call did not finish before the request deadline.
    #[error("Request timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Classifies a storage error for an operation whose generic failure
    /// message is `failure`.
    pub fn from_db(err: DbError, failure: &'static str) -> Self {
        match err {
            DbError::NotFound { entity, .. } => AppError::NotFound(format!("{} not found", entity)),
            DbError::Rule(CoreError::EmptyCart(_)) => AppError::Validation("Cart is empty".to_string()),
            DbError::ForeignKeyViolation { .. } => AppError::Validation("Invalid reference".to_string()),
            err if err.is_client_error() => AppError::Validation(err.to_string()),
            source => AppError::Persistence {
                message: failure,
                source,
            },
        }
    }

    /// The 400 returned when a body, path, or query string cannot be parsed.
    pub fn invalid_request() -> Self {
        AppError::Validation(INVALID_REQUEST_FORMAT.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence { .. } | AppError::Timeout | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound(message) => tracing::warn!(%message, "Responding with not found"),
            AppError::Validation(message) => tracing::debug!(%message, "Rejecting request"),
            AppError::Persistence { message, source } => {
                tracing::error!(error = %source, %message, "Storage operation failed")
            }
            AppError::Timeout => tracing::error!("Storage operation exceeded request deadline"),
            AppError::Config(err) => tracing::error!(error = %err, "Configuration error"),
        }

        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// Extractor rejections never leak their own wording.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Malformed JSON body");
        AppError::invalid_request()
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Malformed path");
        AppError::invalid_request()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Malformed query string");
        AppError::invalid_request()
    }
}

/// Result type for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity() {
        let err = AppError::from_db(DbError::not_found("Cart", "abc"), "Failed to get cart");
        assert_eq!(err.to_string(), "Cart not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_failure_hides_cause() {
        let err = AppError::from_db(
            DbError::QueryFailed("disk I/O error".to_string()),
            "Failed to add product to cart",
        );
        assert_eq!(err.to_string(), "Failed to add product to cart");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_errors_are_bad_requests() {
        let empty = AppError::from_db(
            DbError::Rule(CoreError::EmptyCart("abc".to_string())),
            "Failed to checkout cart",
        );
        assert_eq!(empty.to_string(), "Cart is empty");
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

        let reference = AppError::from_db(
            DbError::invalid_reference("Category", "abc"),
            "Failed to create product",
        );
        assert_eq!(reference.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_is_server_error() {
        assert_eq!(AppError::Timeout.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Timeout.to_string(), "Request timed out");
    }
}
