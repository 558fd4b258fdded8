//! Mock TLS, header, vulnerability and reputation checks.

use chrono::{DateTime, Days, Utc};
use siteaudit_core::model::{
    DomainReputation, HeaderStatus, SecurityHeader, SecurityInfo, Severity, SslInfo, Vulnerability,
};

use super::magnitude;

const ISSUER: &str = "Let's Encrypt Authority X3";

fn header(name: &str, present: bool, value: &str) -> SecurityHeader {
    if present {
        SecurityHeader { name: name.to_string(), value: value.to_string(), status: HeaderStatus::Good }
    } else {
        SecurityHeader { name: name.to_string(), value: String::new(), status: HeaderStatus::Missing }
    }
}

fn vulnerability(severity: Severity, name: &str, description: &str) -> Vulnerability {
    Vulnerability { severity, name: name.to_string(), description: description.to_string() }
}

pub(crate) fn analyze(url: &str, now: DateTime<Utc>) -> SecurityInfo {
    let hash = magnitude(url);
    let valid = hash % 10 != 0;
    let days_to_expiry = 30 + hash % 330;

    let ssl = if valid {
        SslInfo {
            valid,
            issuer: Some(ISSUER.to_string()),
            expiry_date: now.checked_add_days(Days::new(u64::from(days_to_expiry))),
            days_to_expiry: Some(i64::from(days_to_expiry)),
        }
    } else {
        SslInfo { valid, issuer: None, expiry_date: None, days_to_expiry: None }
    };

    let headers = vec![
        header("X-Content-Type-Options", hash % 3 != 0, "nosniff"),
        header("X-Frame-Options", hash % 4 != 0, "SAMEORIGIN"),
        header("Content-Security-Policy", hash % 2 == 0, "default-src 'self'"),
        header("Strict-Transport-Security", hash % 5 != 0, "max-age=31536000; includeSubDomains"),
    ];

    let mut vulnerabilities = Vec::new();
    if hash % 5 == 0 {
        vulnerabilities.push(vulnerability(
            Severity::Medium,
            "jQuery Outdated",
            "An outdated jQuery version was detected that may contain security bugs.",
        ));
    }
    if hash % 7 == 0 {
        vulnerabilities.push(vulnerability(
            Severity::High,
            "Cross-Site Scripting (XSS) Vulnerability",
            "A potential XSS vulnerability was detected in forms.",
        ));
    }
    if hash % 11 == 0 {
        vulnerabilities.push(vulnerability(
            Severity::Low,
            "Cookies without Secure Flag",
            "Some cookies lack the Secure flag and may travel over unencrypted connections.",
        ));
    }

    SecurityInfo { ssl, headers, vulnerabilities }
}

pub(crate) fn reputation(domain: &str) -> DomainReputation {
    let hash = magnitude(domain);
    let blacklisted = hash % 20 == 0;
    let spam_score = if blacklisted { 7 + hash % 3 } else { hash % 2 };

    DomainReputation {
        score: (70 + hash % 30) as u8,
        blacklisted,
        blacklisted_on: if blacklisted { vec!["SpamHaus".to_string()] } else { Vec::new() },
        spam_score: Some(spam_score as u8),
        malware_detected: hash % 50 == 0,
    }
}
