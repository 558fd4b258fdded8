//! Wiring of tiers, collaborators and orchestrator from configuration.

use std::sync::Arc;

use siteaudit_core::cache::DistributedCache;
use siteaudit_core::{AppConfig, AuditService, Clock, Error, ServiceOptions, TieredCache};

use crate::analyze::MockAnalyzer;
use crate::kv::RestKvCache;
use crate::llm::{LlmConfig, LlmRecommender};

/// Build the orchestrator with every tier `config` enables.
///
/// # Errors
///
/// Returns `Error::Distributed` or `Error::Recommendation` if an HTTP client
/// cannot be constructed.
pub async fn build_service(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<AuditService, Error> {
    let distributed = RestKvCache::from_config(config)?.map(|kv| Arc::new(kv) as Arc<dyn DistributedCache>);
    let cache = TieredCache::from_config(config, clock.clone(), distributed).await;

    let recommender = LlmRecommender::new(LlmConfig::from_app_config(config))?;
    if !recommender.has_model() {
        tracing::info!("No model API key configured; recommendations are generated locally");
    }

    Ok(AuditService::new(
        cache,
        Arc::new(MockAnalyzer::new(clock.clone())),
        Arc::new(recommender),
        clock,
        ServiceOptions::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteaudit_core::{CacheStatus, DataSource, SystemClock};

    fn config(dir: &std::path::Path) -> AppConfig {
        AppConfig { cache_dir: dir.to_path_buf(), ..AppConfig::default() }
    }

    #[tokio::test]
    async fn test_end_to_end_generation_and_hit() {
        let dir = tempfile::tempdir().unwrap();
        let service = build_service(&config(dir.path()), Arc::new(SystemClock)).await.unwrap();

        let first = service.get_audit("www.Example.com", false).await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.source, DataSource::Generated);
        assert_eq!(first.record.url, "https://example.com/");
        assert_eq!(first.record.performance.score, 56);
        assert_eq!(first.record.key_issues.len(), 4);
        assert!(first.record.ai_recommendations.is_some());
        assert!(first.record.dns_analysis.is_some());
        assert!(first.record.screenshot.is_some());

        let second = service.get_audit("https://example.com", false).await.unwrap();
        assert_eq!(second.status, CacheStatus::HitFresh);
        assert_eq!(second.source, DataSource::Memory);
        assert_eq!(second.record.timestamp, first.record.timestamp);
    }

    #[tokio::test]
    async fn test_without_kv_credentials_tier_is_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let service = build_service(&config(dir.path()), Arc::new(SystemClock)).await.unwrap();
        assert!(!service.cache().distributed().is_enabled());
        assert!(service.cache().filesystem().is_enabled());
    }

    #[tokio::test]
    async fn test_invalid_url_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let service = build_service(&config(dir.path()), Arc::new(SystemClock)).await.unwrap();
        assert!(service.get_audit_data("ftp://example.com", false).await.is_none());
    }
}
