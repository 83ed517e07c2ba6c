//! Streaming-related error types.
//!
//! Errors that occur once the response body is being consumed as a stream
//! of `data: ` frames.

use thiserror::Error;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// A single frame could not be parsed. Recovered locally; the session
    /// keeps reading.
    #[error("Malformed frame: {message}")]
    MalformedFrame { line: String, message: String },

    /// The backend sent an explicit error frame, or a frame without `event`.
    #[error("Upstream error: {}", .message.as_deref().unwrap_or("Server Error"))]
    Upstream {
        message: Option<String>,
        code: Option<String>,
    },

    /// No chunk arrived within the inactivity window.
    #[error("No data received for {duration_secs}s")]
    InactivityTimeout { duration_secs: u64 },
}

impl StreamError {
    /// Frame-level errors never end a session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StreamError::MalformedFrame { .. })
    }

    /// Check if this error is likely transient and can be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::InactivityTimeout { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::MalformedFrame { .. } => {
                "Received invalid data from server.".to_string()
            }
            StreamError::Upstream { message, .. } => message
                .clone()
                .unwrap_or_else(|| "Server Error".to_string()),
            StreamError::InactivityTimeout { .. } => "Response timed out".to_string(),
        }
    }

    /// Short machine-readable code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::MalformedFrame { .. } => "STREAM_MALFORMED_FRAME",
            StreamError::Upstream { .. } => "STREAM_UPSTREAM",
            StreamError::InactivityTimeout { .. } => "STREAM_TIMEOUT",
        }
    }
}
