//! KV REST client error types.

use std::sync::Arc;

use siteaudit_core::Error;

/// Errors from the REST key/value client.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// Authentication failed (invalid token).
    #[error("authentication failed: invalid token")]
    AuthError,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// The store rejected the command.
    #[error("command failed: {0}")]
    Command(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl KvError {
    /// Whether a second attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            KvError::Timeout | KvError::Network(_) => true,
            KvError::HttpError { status } => *status >= 500,
            KvError::AuthError | KvError::Command(_) | KvError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for KvError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { KvError::Timeout } else { KvError::Network(Arc::new(err)) }
    }
}

impl From<KvError> for Error {
    fn from(err: KvError) -> Self {
        Error::Distributed(err.to_string())
    }
}
