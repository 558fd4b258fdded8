//! LLM client error types.

use std::sync::Arc;

use siteaudit_core::Error;

/// Errors from the recommendation model client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured.
    #[error("missing API key: SITEAUDIT_LLM_API_KEY not set")]
    MissingApiKey,

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the model provider.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response envelope could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The model answered, but not with a usable recommendation.
    #[error("unusable reply: {0}")]
    Unusable(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { LlmError::Timeout } else { LlmError::Network(Arc::new(err)) }
    }
}

impl From<LlmError> for Error {
    fn from(err: LlmError) -> Self {
        Error::Recommendation(err.to_string())
    }
}
