//! Deterministic site analyzers.
//!
//! Every result is derived from a 32-bit hash of the URL or domain, so one
//! site always yields the same audit across processes and restarts. They
//! stand in for real performance, DNS and security engines and implement
//! [`SiteAnalyzer`] so the orchestrator cannot tell the difference.
//!
//! The one input-sensitive path is the SEO check: when page HTML is supplied
//! it is inspected instead of mocked.

mod dns;
mod security;
mod seo;
mod stack;
mod website;

use std::sync::Arc;

use async_trait::async_trait;
use siteaudit_core::model::{DnsAnalysis, DomainReputation, SecurityInfo, SeoAnalysis, ServerInfo, Technology};
use siteaudit_core::service::WebsiteAnalysis;
use siteaudit_core::url::string_hash;
use siteaudit_core::{Clock, Error, SiteAnalyzer};

pub use seo::inspect_html;
pub use stack::detect_technologies;

/// Hash magnitude used by the domain-level mocks.
fn magnitude(input: &str) -> u32 {
    string_hash(input).unsigned_abs()
}

/// Mock analyzer backed by per-URL hashes.
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    clock: Arc<dyn Clock>,
}

impl MockAnalyzer {
    /// The clock dates certificate expiry relative to "now".
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl SiteAnalyzer for MockAnalyzer {
    async fn analyze_website(&self, url: &str) -> Result<WebsiteAnalysis, Error> {
        Ok(website::analyze(url))
    }

    async fn analyze_dns(&self, domain: &str) -> Result<DnsAnalysis, Error> {
        if domain.is_empty() {
            return Err(Error::AnalyzerFailed("dns analysis needs a domain".into()));
        }
        Ok(dns::analyze(domain))
    }

    async fn analyze_security(&self, url: &str) -> Result<SecurityInfo, Error> {
        Ok(security::analyze(url, self.clock.now()))
    }

    async fn domain_reputation(&self, domain: &str) -> Result<DomainReputation, Error> {
        Ok(security::reputation(domain))
    }

    async fn detailed_seo_check(&self, url: &str, html: Option<&str>) -> Result<SeoAnalysis, Error> {
        Ok(seo::check(url, html))
    }

    async fn detect_tech_stack(&self, _url: &str) -> Result<Vec<Technology>, Error> {
        Ok(stack::reference_stack())
    }

    async fn server_info(&self, domain: &str) -> Result<ServerInfo, Error> {
        Ok(stack::server_info(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use siteaudit_core::ManualClock;

    fn analyzer() -> MockAnalyzer {
        MockAnalyzer::new(Arc::new(ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())))
    }

    #[test]
    fn test_magnitude_is_absolute_hash() {
        assert_eq!(magnitude("example.com"), 1_944_013_059);
        assert_eq!(magnitude("a.com"), 91_050_612);
    }

    #[tokio::test]
    async fn test_same_url_same_result() {
        let analyzer = analyzer();
        let first = analyzer.analyze_website("https://example.com/").await.unwrap();
        let second = analyzer.analyze_website("https://example.com/").await.unwrap();
        assert_eq!(first, second);

        let other = analyzer.analyze_website("https://a.com/").await.unwrap();
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_dns_rejects_empty_domain() {
        let result = analyzer().analyze_dns("").await;
        assert!(matches!(result, Err(Error::AnalyzerFailed(_))));
    }

    #[tokio::test]
    async fn test_seo_check_uses_supplied_html() {
        let html = "<html><head><title>Handmade furniture from Brno</title></head><body><h1>Chairs</h1></body></html>";
        let seo = analyzer().detailed_seo_check("https://example.com/", Some(html)).await.unwrap();
        let title = seo.meta_tags.title.unwrap();
        assert_eq!(title.value.as_deref(), Some("Handmade furniture from Brno"));
        assert_eq!(seo.headings.h1_count, 1);
    }
}
