//! Error types for llmstream
//!
//! One error enum covers both adapters so callers can match on the
//! failure class (transport, status, malformed event) regardless of
//! which endpoint produced it.

use thiserror::Error;

/// Main error type for the streaming adapters
#[derive(Error, Debug)]
pub enum LlmError {
    /// Connection or body-read failure on the HTTP transport
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-success status returned before streaming began
    #[error("HTTP {status}: {body}")]
    StatusError { status: u16, body: String },

    /// Error reported by the endpoint in the middle of a stream
    #[error("Streaming error: {0}")]
    StreamingError(String),

    /// Stream payload that could not be decoded
    #[error("Malformed stream event: {0}")]
    JsonParseError(String),

    /// Failure opening or reading a Bedrock converse stream
    #[error("Can't invoke '{model}'. Reason: {reason}")]
    BedrockError { model: String, reason: String },

    /// Caller supplied an argument the adapter cannot honor
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, LlmError>;

impl LlmError {
    /// HTTP status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::StatusError { status, .. } => Some(*status),
            LlmError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
