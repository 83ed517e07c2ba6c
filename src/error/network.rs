//! Network-related error types.
//!
//! Errors raised while issuing a request and waiting for its response,
//! before any stream frame has been decoded.

use thiserror::Error;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// Connection-level failure reported by the transport.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Server answered with a status outside 200..=399.
    #[error("Server error ({status}): {message}")]
    HttpStatus { status: u16, message: String },

    /// Server answered 401.
    #[error("Invalid credentials")]
    Unauthorized,

    /// No response within the fixed request window.
    #[error("Request timed out after {duration_secs}s")]
    RequestTimeout { duration_secs: u64 },

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Transport { .. } => true,
            NetworkError::RequestTimeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::Unauthorized => false,
            NetworkError::Cancelled => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::Transport { message } => message.clone(),
            NetworkError::HttpStatus { message, .. } => message.clone(),
            NetworkError::Unauthorized => "Invalid token".to_string(),
            NetworkError::RequestTimeout { .. } => {
                "Request timed out, please try again".to_string()
            }
            NetworkError::Cancelled => "Request cancelled".to_string(),
        }
    }

    /// Short machine-readable code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::Transport { .. } => "NET_TRANSPORT",
            NetworkError::HttpStatus { .. } => "NET_HTTP_STATUS",
            NetworkError::Unauthorized => "NET_UNAUTHORIZED",
            NetworkError::RequestTimeout { .. } => "NET_TIMEOUT",
            NetworkError::Cancelled => "NET_CANCELLED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let server = NetworkError::HttpStatus {
            status: 503,
            message: "unavailable".to_string(),
        };
        let client = NetworkError::HttpStatus {
            status: 404,
            message: "missing".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!NetworkError::Unauthorized.is_retryable());
        assert!(NetworkError::RequestTimeout { duration_secs: 180 }.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = NetworkError::HttpStatus {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Server error (500): boom");
        assert_eq!(
            NetworkError::RequestTimeout { duration_secs: 180 }.to_string(),
            "Request timed out after 180s"
        );
    }

    #[test]
    fn test_unauthorized_user_message_is_fixed() {
        assert_eq!(NetworkError::Unauthorized.user_message(), "Invalid token");
    }
}
