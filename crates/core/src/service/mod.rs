//! Audit orchestrator.
//!
//! [`AuditService`] is the only entry point callers use. It normalizes the
//! URL, walks the cache tiers, applies the freshness policy and regenerates
//! through the analyzer collaborators when needed:
//!
//! | lookup result | returned | refresh |
//! |---|---|---|
//! | fresh hit | cached record | none |
//! | stale hit | cached record | background, skipped when the pool is full |
//! | expired hit | cached record | immediate, queued for a pool permit |
//! | miss / forced | new record | caller waits for generation |
//!
//! Generation failures never escape as errors: the caller gets `None`, and
//! background refreshes log and drop theirs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

mod analyzer;
mod coalesce;
mod history;

pub use analyzer::{RawAuditItem, RawCategory, Recommender, SiteAnalyzer, WebsiteAnalysis};
pub use coalesce::{Coalescer, FlightGuard};
pub use history::{AuditHistory, HistoryEntry};

use crate::Error;
use crate::cache::{CacheStatus, DataSource, FreshnessPolicy, RefreshAction, TieredCache};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::model::AuditRecord;
use crate::url::{cache_key, extract_domain, normalize_url, screenshot_url};

const HISTORY_CAPACITY: usize = 50;

/// Poll interval of [`AuditService::drain_refreshes`].
const DRAIN_POLL: Duration = Duration::from_millis(25);

/// Orchestrator tuning.
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    pub policy: FreshnessPolicy,
    pub generation_timeout: Duration,
    pub max_background_refreshes: usize,
    pub single_flight: bool,
}

impl ServiceOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            policy: FreshnessPolicy::new(config.fresh_window(), config.stale_window()),
            generation_timeout: config.generation_timeout(),
            max_background_refreshes: config.max_background_refreshes,
            single_flight: config.single_flight,
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// A served audit and how it was obtained.
#[derive(Debug, Clone)]
pub struct AuditHit {
    pub record: Arc<AuditRecord>,
    pub status: CacheStatus,
    pub source: DataSource,
}

#[derive(Debug)]
struct ServiceInner {
    cache: TieredCache,
    analyzer: Arc<dyn SiteAnalyzer>,
    recommender: Arc<dyn Recommender>,
    clock: Arc<dyn Clock>,
    policy: FreshnessPolicy,
    generation_timeout: Duration,
    coalescer: Option<Coalescer>,
    background: Arc<Semaphore>,
    active_refreshes: AtomicUsize,
    history: AuditHistory,
}

/// The audit orchestrator. Cheap to clone; clones share all state.
#[derive(Debug, Clone)]
pub struct AuditService {
    inner: Arc<ServiceInner>,
}

struct RefreshSlot<'a>(&'a AtomicUsize);

impl Drop for RefreshSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl AuditService {
    pub fn new(
        cache: TieredCache, analyzer: Arc<dyn SiteAnalyzer>, recommender: Arc<dyn Recommender>, clock: Arc<dyn Clock>,
        options: ServiceOptions,
    ) -> Self {
        let inner = ServiceInner {
            cache,
            analyzer,
            recommender,
            clock,
            policy: options.policy,
            generation_timeout: options.generation_timeout,
            coalescer: options.single_flight.then(Coalescer::new),
            background: Arc::new(Semaphore::new(options.max_background_refreshes.max(1))),
            active_refreshes: AtomicUsize::new(0),
            history: AuditHistory::new(HISTORY_CAPACITY),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn cache(&self) -> &TieredCache {
        &self.inner.cache
    }

    pub fn history(&self) -> &AuditHistory {
        &self.inner.history
    }

    /// Background refreshes currently running or waiting for a permit.
    pub fn active_refreshes(&self) -> usize {
        self.inner.active_refreshes.load(Ordering::Acquire)
    }

    /// Wait until no background refresh is running, for at most `limit`.
    /// Returns whether the pool drained. Short-lived callers use this so a
    /// refresh started by their lookup is not cut off at exit.
    pub async fn drain_refreshes(&self, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            if self.active_refreshes() == 0 {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(DRAIN_POLL).await;
        }
    }

    /// Audit for `url`, or `None` when it cannot be produced.
    pub async fn get_audit_data(&self, url: &str, force_refresh: bool) -> Option<Arc<AuditRecord>> {
        self.get_audit(url, force_refresh).await.map(|hit| hit.record)
    }

    /// Regenerate regardless of cache state.
    pub async fn refresh_audit_for_url(&self, url: &str) -> Option<Arc<AuditRecord>> {
        self.get_audit_data(url, true).await
    }

    /// Like [`AuditService::get_audit_data`] but also reports cache status and source.
    pub async fn get_audit(&self, url: &str, force_refresh: bool) -> Option<AuditHit> {
        let canonical = match normalize_url(url) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::warn!(url, error = %e, "Rejecting audit request");
                return None;
            }
        };
        let key = cache_key(&canonical);
        let canonical = canonical.to_string();
        let requested_at = self.inner.clock.now();

        if force_refresh {
            tracing::debug!(url = %canonical, cache_status = %CacheStatus::Forced, "Forced audit refresh");
            let record = self.regenerate(&canonical, &key, requested_at).await?;
            return Some(AuditHit { record, status: CacheStatus::Forced, source: DataSource::Generated });
        }

        if let Some(hit) = self.inner.cache.lookup(&key).await {
            let now = self.inner.clock.now();
            let freshness = self.inner.policy.classify(hit.timestamp, now);
            let status = CacheStatus::from(freshness);
            let age_ms = now.signed_duration_since(hit.timestamp).num_milliseconds().max(0);

            tracing::debug!(url = %canonical, cache_status = %status, source = %hit.source, age_ms, "Audit cache hit");

            match freshness.refresh_action() {
                RefreshAction::None => {}
                RefreshAction::Background => self.schedule_background_refresh(canonical, key, now),
                RefreshAction::Immediate => self.spawn_immediate_refresh(canonical, key, now),
            }

            return Some(AuditHit { record: hit.record, status, source: hit.source });
        }

        tracing::debug!(url = %canonical, cache_status = %CacheStatus::Miss, "Audit cache miss");
        let record = self.regenerate(&canonical, &key, requested_at).await?;
        Some(AuditHit { record, status: CacheStatus::Miss, source: DataSource::Generated })
    }

    /// Remove `url` from every tier.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the URL cannot be normalized.
    pub async fn invalidate(&self, url: &str) -> Result<bool, Error> {
        let canonical = normalize_url(url)?;
        let removed = self.inner.cache.invalidate(&cache_key(&canonical)).await;
        tracing::info!(url = %canonical, removed, "Invalidated cached audit");
        Ok(removed)
    }

    /// Stale path: run on the bounded pool, or skip when it is saturated.
    fn schedule_background_refresh(&self, url: String, key: String, requested_at: DateTime<Utc>) {
        let permit = match Arc::clone(&self.inner.background).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!(url = %url, "Background refresh pool saturated; skipping refresh");
                return;
            }
        };

        self.inner.active_refreshes.fetch_add(1, Ordering::AcqRel);
        let service = self.clone();
        tokio::spawn(async move {
            let _slot = RefreshSlot(&service.inner.active_refreshes);
            let _permit = permit;
            service.run_refresh(&url, &key, requested_at, "background").await;
        });
    }

    /// Expired path: start now, waiting for a pool permit if necessary.
    fn spawn_immediate_refresh(&self, url: String, key: String, requested_at: DateTime<Utc>) {
        self.inner.active_refreshes.fetch_add(1, Ordering::AcqRel);
        let service = self.clone();
        tokio::spawn(async move {
            let _slot = RefreshSlot(&service.inner.active_refreshes);
            let Ok(_permit) = Arc::clone(&service.inner.background).acquire_owned().await else {
                return;
            };
            service.run_refresh(&url, &key, requested_at, "immediate").await;
        });
    }

    async fn run_refresh(&self, url: &str, key: &str, requested_at: DateTime<Utc>, mode: &'static str) {
        if self.regenerate(url, key, requested_at).await.is_some() {
            tracing::info!(url, mode, "Audit refresh complete");
        } else {
            tracing::warn!(url, mode, "Audit refresh failed; cached record kept");
        }
    }

    /// Generate, write through, and record in history.
    ///
    /// With single-flight on, a caller that had to wait for another
    /// regeneration of the same key reuses its result if it was produced after
    /// `requested_at`.
    async fn regenerate(&self, url: &str, key: &str, requested_at: DateTime<Utc>) -> Option<Arc<AuditRecord>> {
        let _flight = match &self.inner.coalescer {
            Some(coalescer) => {
                let flight = coalescer.acquire(key).await;
                if flight.waited()
                    && let Some((record, timestamp)) = self.inner.cache.memory().get(key).await
                    && timestamp >= requested_at
                {
                    tracing::debug!(url, "Reusing audit generated by concurrent request");
                    return Some(record);
                }
                Some(flight)
            }
            None => None,
        };

        let started = std::time::Instant::now();
        let outcome = match tokio::time::timeout(self.inner.generation_timeout, self.generate(url)).await {
            Ok(result) => result,
            Err(_) => Err(Error::GenerationTimeout(format!(
                "{url} not ready after {}ms",
                self.inner.generation_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(record) => {
                let record = Arc::new(record);
                self.inner.cache.write_through(key, Arc::clone(&record)).await;
                self.inner.history.record(&record);
                tracing::info!(
                    url,
                    source = %DataSource::Generated,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Generated audit"
                );
                Some(record)
            }
            Err(e) => {
                tracing::error!(url, error = %e, "Audit generation failed");
                None
            }
        }
    }

    /// Run the collaborators and assemble a new record.
    async fn generate(&self, url: &str) -> Result<AuditRecord, Error> {
        let analyzer = &self.inner.analyzer;
        let domain = extract_domain(url);

        let website = analyzer.analyze_website(url).await?;

        let (dns, security, reputation, seo, tech_stack, server) = tokio::join!(
            analyzer.analyze_dns(&domain),
            analyzer.analyze_security(url),
            analyzer.domain_reputation(&domain),
            analyzer.detailed_seo_check(url, None),
            analyzer.detect_tech_stack(url),
            analyzer.server_info(&domain),
        );

        let mut record = AuditRecord {
            url: url.to_string(),
            timestamp: self.inner.clock.now(),
            performance: website.performance.into_category(),
            seo: website.seo.into_category(),
            accessibility: website.accessibility.into_category(),
            best_practices: website.best_practices.into_category(),
            ai_recommendations: None,
            key_issues: website.key_issues,
            screenshot: Some(screenshot_url(url)),
            server_info: enrichment(url, "server_info", server),
            dns_analysis: enrichment(url, "dns_analysis", dns),
            security_info: enrichment(url, "security_info", security),
            domain_reputation: enrichment(url, "domain_reputation", reputation),
            seo_analysis: enrichment(url, "seo_analysis", seo),
            tech_stack: enrichment(url, "tech_stack", tech_stack),
        };

        record.ai_recommendations = enrichment(url, "ai_recommendations", self.inner.recommender.generate_report(&record).await);

        // Stamped on completion so concurrent waiters can recognise it.
        record.timestamp = self.inner.clock.now();
        Ok(record)
    }
}

fn enrichment<T>(url: &str, field: &'static str, result: Result<T, Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(url, field, error = %e, "Audit enrichment unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FsCache, FsCacheOptions, MemoryCache, NullDistributedCache};
    use crate::clock::ManualClock;
    use crate::testing::{FakeAnalyzer, FakeRecommender, sample_record};
    use chrono::Duration as Span;

    const URL: &str = "https://example.com/";
    const KEY: &str = "audit:https://example.com/";

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    struct Harness {
        service: AuditService,
        analyzer: Arc<FakeAnalyzer>,
        clock: Arc<ManualClock>,
        _dir: tempfile::TempDir,
    }

    async fn harness_with(analyzer: FakeAnalyzer, options: ServiceOptions) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(t0()));
        let fs_options = FsCacheOptions { max_age: Duration::from_secs(604_800), capacity: 100, cleanup_delay: Duration::ZERO };
        let cache = TieredCache::new(
            MemoryCache::new(100, clock.clone()),
            FsCache::open(dir.path(), fs_options).await,
            Arc::new(NullDistributedCache),
            Duration::from_secs(604_800),
            clock.clone(),
        );
        let analyzer = Arc::new(analyzer);
        let service = AuditService::new(cache, analyzer.clone(), Arc::new(FakeRecommender), clock.clone(), options);
        Harness { service, analyzer, clock, _dir: dir }
    }

    async fn harness() -> Harness {
        harness_with(FakeAnalyzer::default(), ServiceOptions::default()).await
    }

    async fn seed(h: &Harness, age: Span) -> Arc<AuditRecord> {
        let record = Arc::new(sample_record(URL, t0() - age));
        h.service.cache().write_through(KEY, record.clone()).await;
        record
    }

    async fn wait_for_calls(analyzer: &FakeAnalyzer, expected: usize) {
        for _ in 0..200 {
            if analyzer.website_calls() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {expected} analyzer calls, saw {}", analyzer.website_calls());
    }

    async fn wait_for_idle(service: &AuditService) {
        for _ in 0..200 {
            if service.active_refreshes() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("background refreshes did not finish");
    }

    #[tokio::test]
    async fn test_miss_generates_and_caches() {
        let h = harness().await;

        let hit = h.service.get_audit("www.Example.com", false).await.unwrap();

        assert_eq!(hit.status, CacheStatus::Miss);
        assert_eq!(hit.source, DataSource::Generated);
        assert_eq!(hit.record.url, URL);
        assert_eq!(hit.record.timestamp, t0());
        assert_eq!(h.analyzer.website_calls(), 1);
        assert!(h.service.cache().memory().contains(KEY).await);
        assert!(h.service.cache().filesystem().contains(KEY).await);
    }

    #[tokio::test]
    async fn test_generated_record_is_assembled() {
        let h = harness().await;
        let record = h.service.get_audit_data(URL, false).await.unwrap();

        assert_eq!(record.performance.score, 75);
        assert!(record.dns_analysis.is_some());
        assert!(record.security_info.is_some());
        assert!(record.seo_analysis.is_some());
        assert!(record.tech_stack.is_some());
        assert!(record.server_info.is_some());
        assert!(record.domain_reputation.is_some());
        assert_eq!(record.ai_recommendations.as_ref().unwrap().summary, "summary for https://example.com/");
        assert!(record.screenshot.as_deref().unwrap().starts_with("https://api.microlink.io/"));
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_analyzer() {
        let h = harness().await;
        let seeded = seed(&h, Span::minutes(10)).await;

        let hit = h.service.get_audit("example.com", false).await.unwrap();

        assert_eq!(hit.status, CacheStatus::HitFresh);
        assert_eq!(hit.source, DataSource::Memory);
        assert!(Arc::ptr_eq(&hit.record, &seeded));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(h.analyzer.website_calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_hit_serves_cached_and_refreshes_in_background() {
        let h = harness().await;
        let seeded = seed(&h, Span::hours(2)).await;

        let hit = h.service.get_audit(URL, false).await.unwrap();

        assert_eq!(hit.status, CacheStatus::HitStale);
        assert!(Arc::ptr_eq(&hit.record, &seeded));

        wait_for_calls(&h.analyzer, 1).await;
        wait_for_idle(&h.service).await;
        let (fresh, timestamp) = h.service.cache().memory().get(KEY).await.unwrap();
        assert_eq!(timestamp, t0());
        assert!(!Arc::ptr_eq(&fresh, &seeded));
    }

    #[tokio::test]
    async fn test_expired_hit_serves_cached_and_refreshes_immediately() {
        let h = harness().await;
        let seeded = seed(&h, Span::days(8)).await;

        let hit = h.service.get_audit(URL, false).await.unwrap();

        assert_eq!(hit.status, CacheStatus::HitExpired);
        assert!(Arc::ptr_eq(&hit.record, &seeded));
        wait_for_calls(&h.analyzer, 1).await;
        wait_for_idle(&h.service).await;
    }

    #[tokio::test]
    async fn test_drain_refreshes_waits_for_background_work() {
        let h = harness_with(FakeAnalyzer::with_delay(Duration::from_millis(50)), ServiceOptions::default()).await;
        let seeded = seed(&h, Span::hours(2)).await;

        h.service.get_audit(URL, false).await.unwrap();
        assert_eq!(h.service.active_refreshes(), 1);

        assert!(h.service.drain_refreshes(Duration::from_secs(5)).await);
        assert_eq!(h.service.active_refreshes(), 0);
        let (fresh, _) = h.service.cache().memory().get(KEY).await.unwrap();
        assert!(!Arc::ptr_eq(&fresh, &seeded));
    }

    #[tokio::test]
    async fn test_drain_refreshes_gives_up_after_limit() {
        let h = harness_with(FakeAnalyzer::with_delay(Duration::from_millis(500)), ServiceOptions::default()).await;
        seed(&h, Span::days(8)).await;

        h.service.get_audit(URL, false).await.unwrap();
        assert!(!h.service.drain_refreshes(Duration::from_millis(30)).await);
        assert!(h.service.drain_refreshes(Duration::from_secs(5)).await);
        assert!(h.service.drain_refreshes(Duration::ZERO).await);
    }

    #[tokio::test]
    async fn test_failed_background_refresh_keeps_stale_record() {
        let h = harness_with(FakeAnalyzer::failing(), ServiceOptions::default()).await;
        let seeded = seed(&h, Span::hours(2)).await;

        let hit = h.service.get_audit(URL, false).await.unwrap();
        assert!(Arc::ptr_eq(&hit.record, &seeded));

        wait_for_calls(&h.analyzer, 1).await;
        wait_for_idle(&h.service).await;
        let (cached, _) = h.service.cache().memory().get(KEY).await.unwrap();
        assert!(Arc::ptr_eq(&cached, &seeded));
    }

    #[tokio::test]
    async fn test_saturated_pool_skips_stale_refresh() {
        let options = ServiceOptions { max_background_refreshes: 1, ..ServiceOptions::default() };
        let h = harness_with(FakeAnalyzer::with_delay(Duration::from_millis(100)), options).await;
        seed(&h, Span::hours(2)).await;
        let other = Arc::new(sample_record("https://other.com/", t0() - Span::hours(2)));
        h.service.cache().write_through("audit:https://other.com/", other).await;

        h.service.get_audit(URL, false).await.unwrap();
        h.service.get_audit("https://other.com/", false).await.unwrap();

        wait_for_idle(&h.service).await;
        assert_eq!(h.analyzer.website_calls(), 1);
    }

    #[tokio::test]
    async fn test_forced_refresh_bypasses_fresh_entry() {
        let h = harness().await;
        let seeded = seed(&h, Span::minutes(10)).await;

        let hit = h.service.get_audit(URL, true).await.unwrap();

        assert_eq!(hit.status, CacheStatus::Forced);
        assert_eq!(hit.source, DataSource::Generated);
        assert_eq!(h.analyzer.website_calls(), 1);
        assert!(hit.record.timestamp > seeded.timestamp);
        let (cached, _) = h.service.cache().memory().get(KEY).await.unwrap();
        assert!(Arc::ptr_eq(&cached, &hit.record));
    }

    #[tokio::test]
    async fn test_refresh_audit_for_url_is_forced() {
        let h = harness().await;
        seed(&h, Span::minutes(1)).await;
        h.clock.advance(Span::seconds(5));

        let record = h.service.refresh_audit_for_url("example.com").await.unwrap();
        assert_eq!(record.timestamp, t0() + Span::seconds(5));
        assert_eq!(h.analyzer.website_calls(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_none() {
        let h = harness_with(FakeAnalyzer::failing(), ServiceOptions::default()).await;
        assert!(h.service.get_audit_data(URL, false).await.is_none());
        assert!(!h.service.cache().memory().contains(KEY).await);
    }

    #[tokio::test]
    async fn test_invalid_url_returns_none() {
        let h = harness().await;
        assert!(h.service.get_audit_data("   ", false).await.is_none());
        assert!(h.service.get_audit_data("ftp://example.com", false).await.is_none());
        assert_eq!(h.analyzer.website_calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_timeout_returns_none() {
        let options = ServiceOptions { generation_timeout: Duration::from_millis(20), ..ServiceOptions::default() };
        let h = harness_with(FakeAnalyzer::with_delay(Duration::from_millis(500)), options).await;
        assert!(h.service.get_audit_data(URL, false).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_enrichment_leaves_field_empty() {
        let h = harness_with(FakeAnalyzer::without_dns(), ServiceOptions::default()).await;
        let record = h.service.get_audit_data(URL, false).await.unwrap();
        assert!(record.dns_analysis.is_none());
        assert!(record.security_info.is_some());
    }

    #[tokio::test]
    async fn test_single_flight_collapses_concurrent_misses() {
        let h = harness_with(FakeAnalyzer::with_delay(Duration::from_millis(50)), ServiceOptions::default()).await;

        let (a, b, c) = tokio::join!(
            h.service.get_audit_data(URL, false),
            h.service.get_audit_data("www.example.com", false),
            h.service.get_audit_data("EXAMPLE.com", false),
        );

        assert_eq!(h.analyzer.website_calls(), 1);
        let a = a.unwrap();
        assert!(Arc::ptr_eq(&a, &b.unwrap()));
        assert!(Arc::ptr_eq(&a, &c.unwrap()));
    }

    #[tokio::test]
    async fn test_without_single_flight_concurrent_misses_duplicate() {
        let options = ServiceOptions { single_flight: false, ..ServiceOptions::default() };
        let h = harness_with(FakeAnalyzer::with_delay(Duration::from_millis(50)), options).await;

        let (a, b) = tokio::join!(h.service.get_audit_data(URL, false), h.service.get_audit_data(URL, false));

        assert!(a.is_some() && b.is_some());
        assert_eq!(h.analyzer.website_calls(), 2);
    }

    #[tokio::test]
    async fn test_filesystem_hit_is_promoted_before_classification() {
        let h = harness().await;
        let record = sample_record(URL, t0() - Span::minutes(5));
        h.service.cache().filesystem().set(KEY, &record).await.unwrap();

        let hit = h.service.get_audit(URL, false).await.unwrap();
        assert_eq!(hit.source, DataSource::Filesystem);
        assert_eq!(hit.status, CacheStatus::HitFresh);
        assert!(h.service.cache().memory().contains(KEY).await);
    }

    #[tokio::test]
    async fn test_memory_only_when_filesystem_unavailable() {
        let clock = Arc::new(ManualClock::new(t0()));
        let cache = TieredCache::new(
            MemoryCache::new(10, clock.clone()),
            FsCache::disabled(),
            Arc::new(NullDistributedCache),
            Duration::from_secs(604_800),
            clock.clone(),
        );
        let analyzer = Arc::new(FakeAnalyzer::default());
        let service =
            AuditService::new(cache, analyzer.clone(), Arc::new(FakeRecommender), clock, ServiceOptions::default());

        assert!(service.get_audit_data(URL, false).await.is_some());
        assert!(service.cache().memory().contains(KEY).await);
        assert!(service.get_audit_data(URL, false).await.is_some());
        assert_eq!(analyzer.website_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_then_regenerate() {
        let h = harness().await;
        h.service.get_audit_data(URL, false).await.unwrap();

        assert!(h.service.invalidate("www.example.com").await.unwrap());
        assert!(!h.service.cache().memory().contains(KEY).await);
        assert!(matches!(h.service.invalidate("").await, Err(Error::InvalidUrl(_))));

        h.service.get_audit_data(URL, false).await.unwrap();
        assert_eq!(h.analyzer.website_calls(), 2);
    }

    #[tokio::test]
    async fn test_history_records_generations() {
        let h = harness().await;
        h.service.get_audit_data("a.com", false).await.unwrap();
        h.service.get_audit_data("b.com", false).await.unwrap();

        let history = h.service.history().latest(10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].domain, "b.com");
    }
}
