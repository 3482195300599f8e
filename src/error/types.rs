//! Core error types.

use thiserror::Error;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-level failures (connect, timeout, transport).
    Network,
    /// 4xx responses.
    Client,
    /// 5xx responses.
    Server,
    /// Invalid configuration or caller input.
    Validation,
    /// Response payload could not be decoded.
    Parsing,
    /// Local I/O failures (e.g. reading an upload file).
    Io,
}

/// Error type for all client operations.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Generic HTTP failure reported by the transport.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The connection could not be established.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request timed out.
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// Non-success status returned by the server.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Invalid caller-supplied input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Response could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Local I/O error.
    #[error("IO error: {0}")]
    IoError(String),
}

impl ClientError {
    /// Create an API error without details.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::ConnectionError(_) | Self::TimeoutError(_) => {
                ErrorCategory::Network
            }
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Server,
            Self::ApiError { .. } => ErrorCategory::Client,
            Self::ConfigurationError(_) | Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::ParseError(_) => ErrorCategory::Parsing,
            Self::IoError(_) => ErrorCategory::Io,
        }
    }

    /// Whether repeating the same request could succeed.
    ///
    /// Note that a request whose body was streamed (for example after chunked
    /// transfer was forced) cannot be replayed as-is; callers must rebuild it.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::TimeoutError(_) => true,
            Self::ApiError { code, .. } => matches!(code, 408 | 429) || *code >= 500,
            _ => false,
        }
    }
}
