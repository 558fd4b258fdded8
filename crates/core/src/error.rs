//! Unified error types for siteaudit.
//!
//! Display strings carry a stable uppercase code so log lines and HTTP
//! error bodies can be grepped by failure class.

use crate::url::UrlError;

/// Unified error type for the audit core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested URL could not be normalized.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(#[from] UrlError),

    /// Filesystem tier I/O failed.
    #[error("CACHE_IO: {0}")]
    CacheIo(#[from] std::io::Error),

    /// A cached record could not be decoded or encoded.
    #[error("CACHE_CORRUPT: {0}")]
    CacheCorrupt(String),

    /// Distributed key/value tier failed (network, protocol, serialization).
    #[error("KV_ERROR: {0}")]
    Distributed(String),

    /// An analyzer collaborator failed.
    #[error("ANALYZER_FAILED: {0}")]
    AnalyzerFailed(String),

    /// Regeneration did not finish within the configured window.
    #[error("GENERATION_TIMEOUT: {0}")]
    GenerationTimeout(String),

    /// Recommendation generation failed.
    #[error("RECOMMENDATION_FAILED: {0}")]
    Recommendation(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::CacheCorrupt(err.to_string())
    }
}
