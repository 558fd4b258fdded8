//! Audit record data model.
//!
//! Records are immutable once built: a refresh always produces a new
//! [`AuditRecord`] and replaces the cached one wholesale. Field names
//! serialize in camelCase, which is also the on-disk and KV format.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod score;

pub use score::{ScoreSnapshot, normalize_score};

/// The cached unit: one complete audit of one canonical URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Canonical URL (see [`crate::url::normalize_url`]).
    pub url: String,
    /// When this record was generated. Drives freshness, never touched by reads.
    pub timestamp: DateTime<Utc>,
    pub performance: AuditCategory,
    pub seo: AuditCategory,
    pub accessibility: AuditCategory,
    pub best_practices: AuditCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_recommendations: Option<AiRecommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_issues: Vec<KeyIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_analysis: Option<DnsAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_info: Option<SecurityInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_reputation: Option<DomainReputation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_analysis: Option<SeoAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<Technology>>,
}

/// Score plus the sub-audits that produced it. Scores are 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditCategory {
    pub score: u8,
    #[serde(default)]
    pub audits: Vec<AuditItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditItem {
    pub title: String,
    pub description: String,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyIssue {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

/// Summary plus prioritized action items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub summary: String,
    pub priorities: Vec<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub ip: String,
    pub server: String,
    pub location: String,
    pub dns: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsIssue {
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsAnalysis {
    pub records: Vec<DnsRecord>,
    #[serde(default)]
    pub issues: Vec<DnsIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslInfo {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_to_expiry: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStatus {
    Good,
    Warning,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityHeader {
    pub name: String,
    pub value: String,
    pub status: HeaderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub severity: Severity,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityInfo {
    pub ssl: SslInfo,
    pub headers: Vec<SecurityHeader>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainReputation {
    pub score: u8,
    pub blacklisted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blacklisted_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spam_score: Option<u8>,
    pub malware_detected: bool,
}

/// One inspected meta tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaTag {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default)]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MetaTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<MetaTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robots: Option<MetaTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<MetaTag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingStructure {
    pub valid: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headings {
    pub h1_count: u32,
    pub h2_count: u32,
    pub h3_count: u32,
    pub structure: HeadingStructure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub word_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability_score: Option<u8>,
    #[serde(default)]
    pub keywords_found: Vec<String>,
    #[serde(default)]
    pub keyword_density: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoCheck {
    pub title: String,
    pub status: CheckStatus,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAnalysis {
    pub score: u8,
    pub meta_tags: MetaTags,
    pub headings: Headings,
    pub content_analysis: ContentAnalysis,
    pub checks: Vec<SeoCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Technology {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), version: None, category: None }
    }
}
