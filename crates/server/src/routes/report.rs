//! `/api/report/:id`: shareable report links.
//!
//! The `Path` extractor has already percent-decoded the id, so the URL part
//! is used as-is rather than decoded a second time.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use siteaudit_core::url::report_id_target;

use crate::app::AppState;
use crate::error::ApiError;

pub async fn get_report(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let url = report_id_target(&id).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    let record = state
        .service
        .get_audit_data(url, false)
        .await
        .ok_or_else(|| ApiError::ReportUnavailable(format!("could not produce audit for {url}")))?;
    Ok(Json(record.as_ref()).into_response())
}
