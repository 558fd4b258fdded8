//! `/api/audit/data` and `/api/audit/history`.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use siteaudit_core::service::HistoryEntry;
use siteaudit_core::url::normalize_url;

use crate::app::AppState;
use crate::error::ApiError;

const X_CACHE_TIMESTAMP: HeaderName = HeaderName::from_static("x-cache-timestamp");
const X_CACHE_STATUS: HeaderName = HeaderName::from_static("x-cache-status");
const X_CACHE_SOURCE: HeaderName = HeaderName::from_static("x-cache-source");

const REFRESH_CACHE_CONTROL: &str = "no-store, must-revalidate";
const SHARED_CACHE_CONTROL: &str = "public, max-age=86400, stale-while-revalidate=3600";

const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub url: Option<String>,
    pub refresh: Option<String>,
}

impl AuditQuery {
    /// Only the literal `true` forces a refresh; anything else is a normal read.
    fn force_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateOutput {
    pub url: String,
    pub removed: bool,
}

/// Canonical form of the `url` parameter.
fn require_url(url: Option<&str>) -> Result<String, ApiError> {
    let url = url.map(str::trim).filter(|url| !url.is_empty());
    let url = url.ok_or_else(|| ApiError::InvalidInput("missing url parameter".into()))?;
    normalize_url(url)
        .map(|canonical| canonical.to_string())
        .map_err(|e| ApiError::InvalidInput(e.to_string()))
}

pub async fn get_data(State(state): State<AppState>, Query(query): Query<AuditQuery>) -> Result<Response, ApiError> {
    let url = require_url(query.url.as_deref())?;
    let refresh = query.force_refresh();
    let hit = state
        .service
        .get_audit(&url, refresh)
        .await
        .ok_or_else(|| ApiError::AuditUnavailable(format!("could not produce audit for {url}")))?;

    let cache_control = if refresh { REFRESH_CACHE_CONTROL } else { SHARED_CACHE_CONTROL };
    let timestamp = hit.record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    let timestamp = HeaderValue::from_str(&timestamp).map_err(|e| ApiError::Internal(e.to_string()))?;

    let headers = [
        (header::CACHE_CONTROL, HeaderValue::from_static(cache_control)),
        (X_CACHE_TIMESTAMP, timestamp),
        (X_CACHE_STATUS, HeaderValue::from_static(hit.status.as_str())),
        (X_CACHE_SOURCE, HeaderValue::from_static(hit.source.as_str())),
    ];
    Ok((headers, Json(hit.record.as_ref())).into_response())
}

pub async fn delete_data(
    State(state): State<AppState>, Query(query): Query<AuditQuery>,
) -> Result<Json<InvalidateOutput>, ApiError> {
    let url = require_url(query.url.as_deref())?;
    let removed = state.service.invalidate(&url).await?;
    Ok(Json(InvalidateOutput { url, removed }))
}

pub async fn history(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Json<Vec<HistoryEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(state.service.history().latest(limit))
}
