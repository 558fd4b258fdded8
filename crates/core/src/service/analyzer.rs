//! Collaborator capabilities consumed by the orchestrator.
//!
//! Analyzers may report scores on either the 0-1 or the 0-100 scale; the
//! conversion into [`AuditCategory`] normalizes them once.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::Error;
use crate::model::{
    AiRecommendation, AuditCategory, AuditItem, AuditRecord, DnsAnalysis, DomainReputation, KeyIssue, SecurityInfo,
    SeoAnalysis, ServerInfo, Technology, normalize_score,
};

/// A sub-audit as reported by an analyzer, before score normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAuditItem {
    pub title: String,
    pub description: String,
    pub score: f64,
}

/// A category as reported by an analyzer, before score normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCategory {
    pub score: f64,
    pub audits: Vec<RawAuditItem>,
}

impl RawCategory {
    pub fn into_category(self) -> AuditCategory {
        AuditCategory {
            score: normalize_score(self.score),
            audits: self
                .audits
                .into_iter()
                .map(|item| AuditItem { title: item.title, description: item.description, score: normalize_score(item.score) })
                .collect(),
        }
    }
}

/// Output of the headline website analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct WebsiteAnalysis {
    pub performance: RawCategory,
    pub seo: RawCategory,
    pub accessibility: RawCategory,
    pub best_practices: RawCategory,
    pub key_issues: Vec<KeyIssue>,
}

/// Produces the analysis parts of an audit for one URL.
///
/// `analyze_website` is mandatory for a record; every other method is an
/// enrichment whose failure leaves the matching field empty.
#[async_trait]
pub trait SiteAnalyzer: Send + Sync + Debug {
    async fn analyze_website(&self, url: &str) -> Result<WebsiteAnalysis, Error>;

    async fn analyze_dns(&self, domain: &str) -> Result<DnsAnalysis, Error>;

    async fn analyze_security(&self, url: &str) -> Result<SecurityInfo, Error>;

    async fn domain_reputation(&self, domain: &str) -> Result<DomainReputation, Error>;

    /// SEO inspection; reads `html` when supplied.
    async fn detailed_seo_check(&self, url: &str, html: Option<&str>) -> Result<SeoAnalysis, Error>;

    async fn detect_tech_stack(&self, url: &str) -> Result<Vec<Technology>, Error>;

    async fn server_info(&self, domain: &str) -> Result<ServerInfo, Error>;
}

/// Turns an assembled audit into a summary with prioritized actions.
#[async_trait]
pub trait Recommender: Send + Sync + Debug {
    async fn generate_report(&self, record: &AuditRecord) -> Result<AiRecommendation, Error>;
}
