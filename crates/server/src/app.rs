//! Router assembly and shared handler state.

use axum::Router;
use axum::routing::get;
use siteaudit_core::AuditService;
use tower_http::trace::TraceLayer;

use crate::routes::{audit, report, stats};

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: AuditService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/audit/data", get(audit::get_data).delete(audit::delete_data))
        .route("/api/audit/history", get(audit::history))
        .route("/api/audit/stats", get(stats::cache_stats))
        .route("/api/report/:id", get(report::get_report))
        .route("/healthz", get(stats::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
