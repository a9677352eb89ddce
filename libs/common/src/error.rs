//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by the session manager and
//! the dashboard. Every failure carries a [`ErrorKind`] discriminant so
//! callers can decide between re-authentication, a retry notice or an
//! inline form message without inspecting messages.

use thiserror::Error;

/// Discriminant for [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidCredentials,
    Validation,
    AuthRejected,
    Network,
    Server,
    MalformedToken,
    Storage,
    Config,
}

/// Error type for every client-side operation that talks to the backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Login refused by the backend
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// User-correctable input problem, detected locally or by the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, expired or server-rejected session
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with an error or an unreadable body
    #[error("Server error ({}): {message}", status_label(.status))]
    Server {
        status: Option<u16>,
        message: String,
    },

    /// Token that cannot be decoded
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Persisted session storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |s| s.to_string())
}

impl ClientError {
    /// Shorthand for a server error with a known status
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ClientError::Server {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::AuthRejected(_) => ErrorKind::AuthRejected,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::MalformedToken(_) => ErrorKind::MalformedToken,
            ClientError::Storage(_) => ErrorKind::Storage,
            ClientError::Config(_) => ErrorKind::Config,
        }
    }

    /// A corrupt token cannot be told apart from an invalid one, so both
    /// force the user back to login.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AuthRejected | ErrorKind::MalformedToken
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Server)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ClientError::server(status.as_u16(), err.to_string());
        }
        if err.is_decode() {
            return ClientError::Server {
                status: None,
                message: format!("Unreadable response body: {}", err),
            };
        }
        ClientError::Network(err.to_string())
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Custom error type for session storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// The backing file does not hold a JSON object of strings
    #[error("Storage format error: {0}")]
    Format(#[source] serde_json::Error),
}

impl From<StorageError> for ClientError {
    fn from(err: StorageError) -> Self {
        ClientError::Storage(err.to_string())
    }
}

/// Type alias for Result with ClientError
pub type ClientResult<T> = Result<T, ClientError>;

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
