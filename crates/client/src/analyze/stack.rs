//! Technology and hosting fingerprints.

use regex::Regex;
use siteaudit_core::model::{ServerInfo, Technology};

use super::magnitude;

const SERVERS: [&str; 5] = ["Apache", "Nginx", "Cloudflare", "Microsoft-IIS", "LiteSpeed"];
const LOCATIONS: [&str; 4] = ["Frankfurt, Germany", "Amsterdam, Netherlands", "Prague, Czech Republic", "Paris, France"];

/// Markup patterns and the technology each one reveals.
const SIGNATURES: [(&str, &str, Option<&str>); 12] = [
    (r"(?i)<script[^>]*react", "React", Some("JavaScript Framework")),
    (r"(?i)<script[^>]*next", "Next.js", Some("JavaScript Framework")),
    (r"(?i)<script[^>]*vue", "Vue.js", Some("JavaScript Framework")),
    (r"(?i)<script[^>]*angular", "Angular", Some("JavaScript Framework")),
    (r"(?i)<link[^>]*bootstrap", "Bootstrap", Some("UI Framework")),
    (r"(?i)<link[^>]*tailwind", "Tailwind CSS", Some("UI Framework")),
    (r"(?i)wordpress", "WordPress", Some("CMS")),
    (r"(?i)shopify", "Shopify", Some("E-commerce")),
    (r"(?i)woocommerce", "WooCommerce", Some("E-commerce")),
    (r"(?i)jquery", "jQuery", Some("JavaScript Library")),
    (r"(?i)analytics", "Google Analytics", Some("Analytics")),
    (r"(?i)gtm", "Google Tag Manager", Some("Tag Manager")),
];

fn tech(name: &str, version: Option<&str>, category: Option<&str>) -> Technology {
    Technology { name: name.to_string(), version: version.map(str::to_string), category: category.map(str::to_string) }
}

/// Technologies whose signatures appear in `html`, falling back to the plain
/// web platform when nothing matches.
pub fn detect_technologies(html: &str) -> Vec<Technology> {
    let found: Vec<Technology> = SIGNATURES
        .iter()
        .filter(|(pattern, _, _)| Regex::new(pattern).is_ok_and(|re| re.is_match(html)))
        .map(|(_, name, category)| tech(name, None, *category))
        .collect();

    if found.is_empty() { ["HTML5", "CSS", "JavaScript"].into_iter().map(Technology::named).collect() } else { found }
}

/// Stack reported when no page is inspected.
pub(crate) fn reference_stack() -> Vec<Technology> {
    vec![
        tech("WordPress", Some("6.4.3"), Some("CMS")),
        tech("PHP", Some("8.1.0"), Some("Programming Language")),
        tech("MySQL", Some("8.0"), Some("Database")),
        tech("jQuery", Some("3.6.0"), Some("JavaScript Library")),
        tech("Bootstrap", Some("5.3.0"), Some("UI Framework")),
        tech("Google Analytics", None, Some("Analytics")),
        tech("Google Tag Manager", None, Some("Tag Manager")),
    ]
}

/// Hosting details; the address matches the mocked A record for `domain`.
pub(crate) fn server_info(domain: &str) -> ServerInfo {
    let hash = magnitude(domain);
    ServerInfo {
        ip: format!("104.{}.{}.{}", hash % 255, (hash >> 8) % 255, (hash >> 16) % 255),
        server: SERVERS[(hash % SERVERS.len() as u32) as usize].to_string(),
        location: LOCATIONS[((hash >> 3) % LOCATIONS.len() as u32) as usize].to_string(),
        dns: domain.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(stack: &[Technology]) -> Vec<&str> {
        stack.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_signatures_compile() {
        assert!(SIGNATURES.iter().all(|(pattern, _, _)| Regex::new(pattern).is_ok()));
    }

    #[test]
    fn test_detects_wordpress_site() {
        let html = r#"<link rel="stylesheet" href="/wp-content/themes/x/bootstrap.min.css">
            <script src="/wp-includes/js/jquery/jquery.min.js"></script>
            <meta name="generator" content="WordPress 6.4">"#;
        assert_eq!(names(&detect_technologies(html)), ["Bootstrap", "WordPress", "jQuery"]);
    }

    #[test]
    fn test_detects_script_frameworks() {
        let html = r#"<script src="/_next/static/chunks/react-dom.js"></script>"#;
        let stack = detect_technologies(html);
        assert_eq!(names(&stack), ["React", "Next.js"]);
        assert_eq!(stack[0].category.as_deref(), Some("JavaScript Framework"));
    }

    #[test]
    fn test_plain_page_falls_back() {
        assert_eq!(names(&detect_technologies("<p>hello</p>")), ["HTML5", "CSS", "JavaScript"]);
    }

    #[test]
    fn test_server_info_matches_dns() {
        let info = server_info("example.com");
        assert_eq!(info.ip, "104.159.156.83");
        assert_eq!(info.dns, "example.com");
        assert!(SERVERS.contains(&info.server.as_str()));
        assert_eq!(server_info("example.com"), info);
    }

    #[test]
    fn test_reference_stack_has_versions() {
        let stack = reference_stack();
        assert_eq!(stack[0].version.as_deref(), Some("6.4.3"));
        assert_eq!(stack.len(), 7);
    }
}
