// ABOUTME: Unified error handling with standard error codes and HTTP responses
// ABOUTME: Maps application errors to JSON error bodies and status codes at the response boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Unified error handling for the Stride API.
//!
//! Every fallible operation in the crate returns [`AppResult`]. The
//! [`AppError`] type carries a stable [`ErrorCode`] that maps to an HTTP
//! status when the error crosses the response boundary, so handlers never
//! build error responses by hand.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Stable error codes exposed in API error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Request lacked credentials
    AuthRequired,
    /// Credentials were present but invalid
    AuthInvalid,
    /// Token was valid once but has expired
    AuthExpired,
    /// Authenticated caller lacks permission for the resource
    PermissionDenied,
    /// Resource does not exist (or is not visible to the caller)
    NotFound,
    /// Request payload or parameters failed validation
    InvalidInput,
    /// Resource already exists (duplicate email, etc.)
    Conflict,
    /// Caller exceeded their request quota
    RateLimitExceeded,
    /// Upstream service (nutrition/exercise proxy) failed
    ExternalServiceError,
    /// Database operation failed
    DatabaseError,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// HTTP status this code maps to
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::ExternalServiceError => StatusCode::BAD_GATEWAY,
            Self::DatabaseError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error carrying a stable code and a human-readable message
#[derive(Debug, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct AppError {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable description, safe to return to clients
    pub message: String,
    /// Seconds until the caller may retry (rate limiting only)
    pub retry_after_secs: Option<u64>,
}

impl AppError {
    /// Create an error with an explicit code
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    /// Missing credentials
    #[must_use]
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    /// Invalid credentials or token
    #[must_use]
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Expired token
    #[must_use]
    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthExpired, message)
    }

    /// Caller is authenticated but not allowed
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, format!("Not found: {}", resource.into()))
    }

    /// Validation failure
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Duplicate resource
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Rate limit exceeded, with a retry hint
    #[must_use]
    pub fn rate_limit(message: impl Into<String>, retry_after_secs: u64) -> Self {
        Self {
            code: ErrorCode::RateLimitExceeded,
            message: message.into(),
            retry_after_secs: Some(retry_after_secs),
        }
    }

    /// Upstream service failure
    #[must_use]
    pub fn external_service(service: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{service}: {}", message.into()),
        )
    }

    /// Database failure
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Unexpected internal failure
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {e}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::database(format!("Database operation failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.status();

        // Internal details are logged, not leaked to clients.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = ?self.code, "Internal error: {}", self.message);
            "Internal server error".to_owned()
        } else {
            self.message
        };

        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": message,
            }
        }));

        let mut response = (status, body).into_response();
        if let Some(secs) = self.retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_expected_statuses() {
        assert_eq!(ErrorCode::AuthInvalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::PermissionDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::RateLimitExceeded.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::ExternalServiceError.status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn rate_limit_error_carries_retry_hint() {
        let err = AppError::rate_limit("slow down", 42);
        assert_eq!(err.retry_after_secs, Some(42));
        assert_eq!(err.code, ErrorCode::RateLimitExceeded);
    }
}
