//! Mock DNS records and the checks run over them.

use siteaudit_core::model::{DnsAnalysis, DnsIssue, DnsRecord, Severity};

use super::magnitude;

const DEFAULT_TTL: u32 = 3600;
const NS_TTL: u32 = 172_800;

fn record(record_type: &str, name: &str, value: impl Into<String>, ttl: u32) -> DnsRecord {
    DnsRecord { record_type: record_type.to_string(), name: name.to_string(), value: value.into(), ttl: Some(ttl) }
}

pub(crate) fn analyze(domain: &str) -> DnsAnalysis {
    let records = mock_records(domain);
    let issues = check_records(&records, domain);
    DnsAnalysis { records, issues }
}

fn mock_records(domain: &str) -> Vec<DnsRecord> {
    let hash = magnitude(domain);
    let mut records = vec![record(
        "A",
        domain,
        format!("104.{}.{}.{}", hash % 255, (hash >> 8) % 255, (hash >> 16) % 255),
        DEFAULT_TTL,
    )];

    if hash % 4 != 0 {
        records.push(record("MX", domain, "10 aspmx.l.google.com.", DEFAULT_TTL));
        records.push(record("MX", domain, "20 alt1.aspmx.l.google.com.", DEFAULT_TTL));
    }

    if hash % 3 != 0 {
        records.push(record("TXT", domain, "v=spf1 include:_spf.google.com ~all", DEFAULT_TTL));
    }

    records.push(record("NS", domain, "ns1.digitalocean.com.", NS_TTL));
    records.push(record("NS", domain, "ns2.digitalocean.com.", NS_TTL));

    if hash % 2 == 0 {
        records.push(record("CNAME", &format!("www.{domain}"), format!("{domain}."), DEFAULT_TTL));
    }

    records
}

fn check_records(records: &[DnsRecord], domain: &str) -> Vec<DnsIssue> {
    let mut issues = Vec::new();
    let www_name = format!("www.{domain}");
    let www_target = format!("www.{domain}.");

    if !records.iter().any(|r| r.record_type == "TXT" && r.value.contains("v=spf1")) {
        issues.push(DnsIssue {
            severity: Severity::Medium,
            description: "Missing SPF record. SPF helps prevent spoofed email from your domain.".into(),
        });
    }

    if !records.iter().any(|r| r.record_type == "MX") {
        issues.push(DnsIssue {
            severity: Severity::Medium,
            description: "Missing MX records. Email for this domain will not be delivered.".into(),
        });
    }

    if !records.iter().any(|r| r.name == www_name || r.value == www_target) {
        issues.push(DnsIssue {
            severity: Severity::Low,
            description: "No record for the www subdomain. Visitors typing www will see an error.".into(),
        });
    }

    let has_dmarc = records
        .iter()
        .any(|r| r.record_type == "TXT" && r.name.starts_with("_dmarc.") && r.value.contains("v=DMARC1"));
    if !has_dmarc {
        issues.push(DnsIssue {
            severity: Severity::Low,
            description: "Missing DMARC record. DMARC adds another layer of protection against spoofing.".into(),
        });
    }

    issues
}
