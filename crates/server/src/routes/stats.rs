//! Cache statistics and liveness.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use siteaudit_core::cache::TierStats;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOutput {
    #[serde(flatten)]
    pub tiers: TierStats,
    pub active_refreshes: usize,
}

pub async fn cache_stats(State(state): State<AppState>) -> Json<StatsOutput> {
    let tiers = state.service.cache().stats().await;
    Json(StatsOutput { tiers, active_refreshes: state.service.active_refreshes() })
}

pub async fn healthz() -> &'static str {
    "ok"
}
