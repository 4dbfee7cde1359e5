//! Error types for WebLoom services
//!
//! Provides:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - JSON error responses in the flat `{"error": ...}` wire format the
//!   API clients expect (500s carry an additional `message` field)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{message}")]
    Validation { message: String },

    // Authentication errors
    #[error("{message}")]
    Unauthorized { message: String },

    // Authorization errors
    #[error("{message}")]
    Forbidden { message: String },

    // Resource errors
    #[error("{resource} not found")]
    NotFound { resource: String },

    // Conflict errors
    #[error("{message}")]
    Conflict { message: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors; `context` is the route-level envelope message,
    // `message` the underlying cause
    #[error("{context}: {message}")]
    Internal { context: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation { message: message.into() }
    }

    /// Shorthand for an authentication failure
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized { message: message.into() }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Wrap an unexpected failure into a route-specific 500 envelope,
    /// leaving client errors (4xx) untouched.
    pub fn into_route_error(self, context: &str) -> Self {
        if self.is_client_error() {
            self
        } else {
            AppError::Internal {
                context: context.to_string(),
                message: self.to_string(),
            }
        }
    }
}

/// Flat error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                "Server error"
            );
        } else {
            tracing::warn!(
                error = %self,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = match self {
            AppError::Internal { context, message } => ErrorResponse {
                error: context,
                message: Some(message),
            },
            AppError::Database(e) => ErrorResponse {
                error: "Database error".to_string(),
                message: Some(e.to_string()),
            },
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            context: "Internal server error".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = AppError::validation("Question is required");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = AppError::NotFound { resource: "Content".into() };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Content not found");
    }

    #[test]
    fn test_route_error_wraps_server_errors() {
        let err = AppError::Database(sqlx::Error::PoolClosed)
            .into_route_error("Failed to process question");
        match err {
            AppError::Internal { context, .. } => {
                assert_eq!(context, "Failed to process question");
            }
            other => panic!("expected Internal, got {:?}", other),
        }
    }

    #[test]
    fn test_route_error_keeps_client_errors() {
        let err = AppError::validation("Question is required")
            .into_route_error("Failed to process question");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Question is required");
    }
}
