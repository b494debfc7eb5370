/**
 * Backend Error Types
 *
 * This module defines error types specific to the relay server.
 * These errors are returned by HTTP handlers (health, presence, bridge) and
 * by the socket handshake. The socket itself never sends errors back to a
 * client; relay-level problems are logged and the event is dropped.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Invalid input on an HTTP route, or a caller that is not allowed to do
 * what it asked for.
 *
 * ## Auth Errors
 *
 * Missing or invalid bearer tokens on a protected route or on a socket
 * handshake that requires one.
 *
 * ## Relay Errors
 *
 * The relay task is gone (shutdown in progress) and cannot answer.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use agora::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::FORBIDDEN, "sender does not match token");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (invalid request, forbidden action)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Authentication failed
    #[error("Authentication error: {message}")]
    AuthError {
        /// Human-readable error message
        message: String,
    },

    /// The relay task stopped and can no longer serve requests
    #[error("Relay unavailable")]
    RelayUnavailable,

    /// Shared error (decoding/validation of protocol payloads)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `AuthError` - 401 Unauthorized
    /// - `RelayUnavailable` - 503 Service Unavailable
    /// - `SharedError` - 400 Bad Request
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::AuthError { .. } => StatusCode::UNAUTHORIZED,
            Self::RelayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::AuthError { message } => message.clone(),
            Self::RelayUnavailable => "relay unavailable".to_string(),
            Self::SharedError(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error() {
        let error = BackendError::handler(StatusCode::FORBIDDEN, "not yours");
        match error {
            BackendError::HandlerError { status, message } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "not yours");
            }
            _ => panic!("Expected HandlerError"),
        }
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            BackendError::auth("missing token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::RelayUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let validation: BackendError = SharedError::validation("receiver", "empty").into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_message() {
        let error: BackendError = SharedError::validation("receiver", "receiver cannot be empty").into();
        assert!(error.message().contains("receiver cannot be empty"));
        assert_eq!(BackendError::RelayUnavailable.message(), "relay unavailable");
    }
}
