//! Unified error type for the client.

use thiserror::Error;

use super::network::NetworkError;
use super::stream::StreamError;

/// Unified error type returned by every public operation.
#[derive(Debug, Error)]
pub enum ChatflowError {
    /// Errors before the body is consumed (transport, status, deadline).
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Errors while consuming a response stream.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// A request or response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The client configuration cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background session task panicked or was aborted.
    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

impl ChatflowError {
    /// Check if the caller may retry. The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatflowError::Network(err) => err.is_retryable(),
            ChatflowError::Stream(err) => err.is_retryable(),
            ChatflowError::Json(_)
            | ChatflowError::InvalidConfig(_)
            | ChatflowError::TaskFailed(_) => false,
        }
    }

    /// True for a caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatflowError::Network(NetworkError::Cancelled))
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ChatflowError::Network(err) => err.user_message(),
            ChatflowError::Stream(err) => err.user_message(),
            ChatflowError::Json(err) => format!("Invalid JSON: {}", err),
            ChatflowError::InvalidConfig(msg) => msg.clone(),
            ChatflowError::TaskFailed(_) => "Internal error".to_string(),
        }
    }

    /// Short machine-readable code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatflowError::Network(err) => err.error_code(),
            ChatflowError::Stream(err) => err.error_code(),
            ChatflowError::Json(_) => "JSON",
            ChatflowError::InvalidConfig(_) => "CONFIG",
            ChatflowError::TaskFailed(_) => "TASK_FAILED",
        }
    }
}
