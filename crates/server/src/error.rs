//! Structured errors for the HTTP surface.
//!
//! Every error renders as `{"error": "<CODE>: <message>"}` with a status
//! matching its class.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use siteaudit_core::Error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request parameter.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No audit could be produced for a valid URL.
    #[error("AUDIT_UNAVAILABLE: {0}")]
    AuditUnavailable(String),

    /// A report id decoded but its audit could not be produced.
    #[error("REPORT_UNAVAILABLE: {0}")]
    ReportUnavailable(String),

    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::AuditUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ReportUnavailable(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidUrl(e) => ApiError::InvalidInput(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
