//! Headline category scores.
//!
//! Scores come out on the 0-1 scale; the orchestrator normalizes them.

use siteaudit_core::model::{KeyIssue, Severity};
use siteaudit_core::service::{RawAuditItem, RawCategory, WebsiteAnalysis};
use siteaudit_core::url::string_hash;

const PERFORMANCE_BASE: f64 = 0.75;
const SEO_BASE: f64 = 0.82;
const ACCESSIBILITY_BASE: f64 = 0.68;
const BEST_PRACTICES_BASE: f64 = 0.85;

fn item(title: &str, description: impl Into<String>, score: f64) -> RawAuditItem {
    RawAuditItem { title: title.to_string(), description: description.into(), score }
}

fn issue(title: &str, description: &str, severity: Severity) -> KeyIssue {
    KeyIssue { title: title.to_string(), description: description.to_string(), severity }
}

pub(crate) fn analyze(url: &str) -> WebsiteAnalysis {
    // Signed on purpose: negative hashes shift scores down.
    let hash = string_hash(url);
    let variation = f64::from(hash % 20) / 100.0;
    let score = |base: f64| (base + variation).clamp(0.0, 1.0);
    let even = hash % 2 == 0;
    let third = hash % 3 == 0;

    let performance = score(PERFORMANCE_BASE);
    let seo = score(SEO_BASE);
    let accessibility = score(ACCESSIBILITY_BASE);
    let best_practices = score(BEST_PRACTICES_BASE);

    let mut key_issues = Vec::new();
    if performance < 0.7 {
        key_issues.push(issue(
            "Slow main page load",
            "First contentful paint takes more than 3 seconds, which can drive visitors away.",
            Severity::High,
        ));
    }
    if seo < 0.7 {
        key_issues.push(issue(
            "Missing meta tags",
            "Some pages have no meta description, which lowers search visibility.",
            Severity::Medium,
        ));
    }
    if accessibility < 0.6 {
        key_issues.push(issue(
            "Insufficient text contrast",
            "Some text has too little contrast against its background and is hard to read.",
            Severity::Medium,
        ));
    }
    if best_practices < 0.7 {
        key_issues.push(issue(
            "Outdated libraries",
            "The site ships libraries with known security issues that should be updated.",
            Severity::High,
        ));
    }

    WebsiteAnalysis {
        performance: RawCategory {
            score: performance,
            audits: vec![
                item(
                    "First Contentful Paint",
                    format!("Time to first contentful paint: {}s", (3.5 - performance * 2.0).round()),
                    performance * 0.9,
                ),
                item(
                    "Time to Interactive",
                    format!("Time until the page is fully interactive: {}s", (6.2 - performance * 3.0).round()),
                    performance * 0.85,
                ),
                item(
                    "Transfer size",
                    format!("Total page weight: {}MB", ((1.0 - performance) * 4.0 + 1.0).round()),
                    (performance * 1.1).min(1.0),
                ),
                if even {
                    item("Image optimization", "Images are well optimized", 0.95)
                } else {
                    item("Image optimization", "Some images could be compressed further", 0.6)
                },
            ],
        },
        seo: RawCategory {
            score: seo,
            audits: vec![
                if seo > 0.7 {
                    item("Meta tags", "Meta tags are implemented correctly", 0.9)
                } else {
                    item("Meta tags", "Some pages have no meta description", 0.5)
                },
                if third {
                    item("Heading structure", "Headings follow a proper hierarchy", 0.95)
                } else {
                    item("Heading structure", "Heading structure is not optimal", 0.7)
                },
                if seo > 0.75 {
                    item("Image alt text", "Most images have alternative text", 0.85)
                } else {
                    item("Image alt text", "Many images are missing alternative text", 0.4)
                },
                if seo > 0.6 {
                    item("Mobile optimization", "The site is well optimized for mobile devices", 0.9)
                } else {
                    item("Mobile optimization", "The site is partly optimized for mobile devices", 0.65)
                },
            ],
        },
        accessibility: RawCategory {
            score: accessibility,
            audits: vec![
                if accessibility > 0.7 {
                    item("Text contrast", "Text contrast is sufficient for readability", 0.9)
                } else {
                    item("Text contrast", "Some text has insufficient contrast", 0.5)
                },
                if even {
                    item("Form labels", "Form fields have proper labels", 0.85)
                } else {
                    item("Form labels", "Some form fields have no labels", 0.6)
                },
                if accessibility > 0.65 {
                    item("Keyboard navigation", "The site can be operated with a keyboard", 0.8)
                } else {
                    item("Keyboard navigation", "Keyboard navigation has gaps", 0.5)
                },
                if third {
                    item("ARIA attributes", "ARIA attributes are implemented correctly", 0.9)
                } else {
                    item("ARIA attributes", "ARIA attributes are implemented incorrectly", 0.7)
                },
            ],
        },
        best_practices: RawCategory {
            score: best_practices,
            audits: vec![
                if even {
                    item("HTTPS", "The site uses a secure connection", 1.0)
                } else {
                    item("HTTPS", "The site does not use a secure connection", 0.0)
                },
                item(
                    "Outdated libraries",
                    "The site ships libraries with known security issues that should be updated.",
                    best_practices,
                ),
            ],
        },
        key_issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_positive_hash_raises_scores() {
        // string_hash("https://a.com/") % 20 == 10
        let analysis = analyze("https://a.com/");
        assert!(close(analysis.performance.score, 0.85));
        assert!(close(analysis.seo.score, 0.92));
        assert!(close(analysis.accessibility.score, 0.78));
        assert!(close(analysis.best_practices.score, 0.95));
        assert!(analysis.key_issues.is_empty());
    }

    #[test]
    fn test_negative_hash_lowers_scores_and_reports_issues() {
        // string_hash("https://example.com/") % 20 == -19
        let analysis = analyze("https://example.com/");
        assert!(close(analysis.performance.score, 0.56));
        assert!(close(analysis.accessibility.score, 0.49));

        let titles: Vec<_> = analysis.key_issues.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Slow main page load", "Missing meta tags", "Insufficient text contrast", "Outdated libraries"]
        );
        assert_eq!(analysis.key_issues[0].severity, Severity::High);
    }

    #[test]
    fn test_parity_driven_audits() {
        let even = analyze("https://a.com/");
        assert!(close(even.best_practices.audits[0].score, 1.0));
        assert!(close(even.performance.audits[3].score, 0.95));

        let odd = analyze("https://b.com/");
        assert!(close(odd.best_practices.audits[0].score, 0.0));
        assert!(close(odd.accessibility.audits[1].score, 0.6));
    }

    #[test]
    fn test_transfer_size_score_capped() {
        let analysis = analyze("https://a.com/");
        assert!(analysis.performance.audits[2].score <= 1.0);
        assert_eq!(analysis.performance.audits.len(), 4);
        assert_eq!(analysis.best_practices.audits.len(), 2);
    }
}
