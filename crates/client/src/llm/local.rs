//! Deterministic recommendations used when the model is unavailable.

use siteaudit_core::model::{AiRecommendation, AuditRecord, Priority};

const MAX_PRIORITIES: usize = 4;
const NEEDS_WORK: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Area {
    Performance,
    Seo,
    Accessibility,
    BestPractices,
}

fn priority(title: impl Into<String>, description: impl Into<String>) -> Priority {
    Priority { title: title.into(), description: description.into() }
}

fn percent(score: f64) -> u32 {
    (score * 100.0).round() as u32
}

/// Weakest weighted areas first, then stack-specific advice while room remains.
pub fn local_report(record: &AuditRecord) -> AiRecommendation {
    let scores = record.score_snapshot();
    let fraction = |score: u8| f64::from(score) / 100.0;
    let domain = siteaudit_core::url::extract_domain(&record.url);

    let mut areas = [
        (Area::Performance, fraction(scores.performance), 1.0),
        (Area::Seo, fraction(scores.seo), 0.9),
        (Area::Accessibility, fraction(scores.accessibility), 0.8),
        (Area::BestPractices, fraction(scores.best_practices), 0.7),
    ];
    areas.sort_by(|a, b| (a.1 * a.2).total_cmp(&(b.1 * b.2)));

    let mut priorities = Vec::new();
    for (area, score, _) in areas {
        if score >= NEEDS_WORK {
            continue;
        }
        priorities.push(area_priority(record, area, score, &domain));
    }

    if priorities.len() < MAX_PRIORITIES
        && let Some(advice) = stack_priority(record)
    {
        priorities.push(advice);
    }
    priorities.truncate(MAX_PRIORITIES);

    if priorities.is_empty() {
        priorities.push(priority(
            "Consultation for further improvements",
            "Your site is in good shape. A review with our developers can uncover further opportunities to stay ahead of the competition and help your business grow.",
        ));
    }

    AiRecommendation { summary: summary(scores.average() / 100.0, &domain), priorities }
}

fn area_priority(record: &AuditRecord, area: Area, score: f64, domain: &str) -> Priority {
    let shown = percent(score);
    match area {
        Area::Performance => {
            let advice = if score < 0.5 {
                "We recommend lazy loading images, minifying CSS and JS, serving static content from a CDN and converting images to WebP."
            } else {
                "Consider browser caching, optimizing the critical rendering path and preloading key resources."
            };
            priority(
                "Optimize loading speed",
                format!("Your site loads slower than it should (score: {shown}/100). {advice}"),
            )
        }
        Area::Seo => {
            let meta_issues = record.seo_analysis.as_ref().is_some_and(|seo| {
                [&seo.meta_tags.title, &seo.meta_tags.description]
                    .into_iter()
                    .flatten()
                    .any(|tag| !tag.issues.is_empty())
            });
            let advice = if meta_issues {
                "Focus on optimizing meta tags, adding structured data (JSON-LD) and improving the heading hierarchy.".to_string()
            } else {
                format!(
                    "We recommend earning quality backlinks, optimizing content for keywords relevant to {domain} and improving internal linking."
                )
            };
            priority(
                "Strengthen your SEO strategy",
                format!("Your SEO score of {shown}/100 leaves room for improvement. {advice}"),
            )
        }
        Area::Accessibility => priority(
            "Make the site inclusive",
            format!(
                "Accessibility is at {shown}/100. Add proper ARIA attributes, sufficient color contrast (at least 4.5:1), keyboard operability and alternative text for every image. This improves the experience for every visitor and widens your audience."
            ),
        ),
        Area::BestPractices => {
            let https = record.security_info.as_ref().is_some_and(|security| security.ssl.valid);
            let mut description = String::new();
            if !https {
                description.push_str("First enable HTTPS to build trust and protect your visitors' data. ");
            }
            description.push_str(
                "Update outdated libraries, add security headers (CSP, X-Frame-Options) and improve error handling. These changes raise security and also help search rankings.",
            );
            priority("Modernize the technical foundation", description)
        }
    }
}

fn stack_priority(record: &AuditRecord) -> Option<Priority> {
    let cms = record
        .tech_stack
        .iter()
        .flatten()
        .find(|tech| tech.category.as_deref() == Some("CMS") || tech.name == "WordPress");

    if let Some(cms) = cms {
        return Some(priority(
            format!("Tune {} for maximum performance", cms.name),
            format!(
                "Remove unused plugins, add server-side caching, optimize database queries and consider hosting tailored to {}.",
                cms.name
            ),
        ));
    }

    record.server_info.as_ref().filter(|info| !info.server.is_empty()).map(|info| {
        priority(
            "Improve the server configuration",
            format!(
                "Your server ({}) would benefit from HTTP/2, proper Gzip or Brotli compression, longer TTLs for static files and a CDN for geographically distributed content.",
                info.server
            ),
        )
    })
}

fn summary(average: f64, domain: &str) -> String {
    let shown = percent(average);
    if average > 0.8 {
        format!(
            "Your site {domain} performs above average with an overall score of {shown}/100. There are still areas where you can gain a competitive edge: acting on these recommendations further improves user experience, conversion rate and search visibility."
        )
    } else if average > 0.6 {
        format!(
            "{domain} has a solid foundation with a score of {shown}/100, but there are significant opportunities for improvement. Our analysis identified the key areas whose optimization leads to better business results and higher search positions."
        )
    } else {
        format!(
            "{domain} scores {shown}/100, which leaves room for fundamental improvement. Acting on these recommendations can markedly improve the performance, usability and visibility of your site."
        )
    }
}
