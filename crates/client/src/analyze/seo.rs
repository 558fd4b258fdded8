//! On-page SEO check.
//!
//! With page HTML the document is parsed and inspected; without it the
//! result is mocked from the URL hash like the other analyzers.

use std::collections::{BTreeMap, HashMap};

use scraper::{ElementRef, Html, Selector};
use siteaudit_core::model::{
    CheckStatus, ContentAnalysis, HeadingStructure, Headings, MetaTag, MetaTags, SeoAnalysis, SeoCheck,
};

use super::magnitude;

const TITLE_MIN: usize = 10;
const TITLE_MAX: usize = 70;
const DESCRIPTION_MIN: usize = 50;
const DESCRIPTION_MAX: usize = 160;
const MIN_WORDS: u32 = 300;
const GOOD_WORDS: u32 = 600;
const KEYWORD_COUNT: usize = 5;
const KEYWORD_MIN_LEN: usize = 4;

pub(crate) fn check(url: &str, html: Option<&str>) -> SeoAnalysis {
    match html {
        Some(html) => inspect_html(html),
        None => mock(url),
    }
}

/// Inspect a rendered page: meta tags, heading counts, body text and images.
pub fn inspect_html(html: &str) -> SeoAnalysis {
    let document = Html::parse_document(html);

    let title = first(&document, "title").map(|el| collapse(&el.text().collect::<String>())).unwrap_or_default();
    let description = attr_of(&document, r#"meta[name="description"]"#, "content").unwrap_or_default();
    let robots = attr_of(&document, r#"meta[name="robots"]"#, "content").unwrap_or_default();
    let canonical = attr_of(&document, r#"link[rel="canonical"]"#, "href").unwrap_or_default();

    let meta_tags = MetaTags {
        title: Some(measured_tag(&title, title_issues(&title))),
        description: Some(measured_tag(&description, description_issues(&description))),
        robots: Some(plain_tag(&robots)),
        canonical: Some(plain_tag(&canonical)),
    };

    let (h1, h2, h3) = (count(&document, "h1"), count(&document, "h2"), count(&document, "h3"));
    let headings = Headings { h1_count: h1, h2_count: h2, h3_count: h3, structure: heading_structure(h1, h2, h3) };

    let text = body_text(&document);
    let content_analysis = content_of(&text);

    let images_described = select(&document, "img")
        .iter()
        .all(|img| img.value().attr("alt").is_some_and(|alt| !alt.trim().is_empty()));

    assemble(meta_tags, headings, content_analysis, images_described)
}

fn mock(url: &str) -> SeoAnalysis {
    let hash = magnitude(url);

    let title = if hash % 10 == 0 {
        MetaTag { exists: false, value: None, length: Some(0), issues: vec!["Missing title tag".into()] }
    } else if hash % 8 == 0 {
        let value = "This is an extremely long title that will likely be truncated in search engine results pages and is not optimal";
        measured_tag(value, title_issues(value))
    } else {
        let value = "Sample Page Title | Website Name";
        measured_tag(value, title_issues(value))
    };

    let description = if hash % 5 == 0 {
        let value = "Short description.";
        measured_tag(value, description_issues(value))
    } else {
        let value = "This is a sample meta description for SEO analysis. It contains relevant keywords and has a length suited to search results.";
        measured_tag(value, description_issues(value))
    };

    let robots = if hash % 7 != 0 {
        plain_tag("index, follow")
    } else {
        MetaTag { exists: false, value: None, length: None, issues: vec!["Missing meta robots tag".into()] }
    };

    let canonical = if hash % 3 != 0 {
        plain_tag(url)
    } else {
        MetaTag { exists: false, value: None, length: None, issues: vec!["Missing canonical tag".into()] }
    };

    let (h1, h2, h3) = (hash % 4, 2 + hash % 5, 3 + hash % 8);
    let headings = Headings { h1_count: h1, h2_count: h2, h3_count: h3, structure: heading_structure(h1, h2, h3) };

    let spread = f64::from(hash % 10) / 10.0;
    let bases = [("example", 0.8), ("keyword", 0.5), ("word", 0.3), ("analysis", 0.2), ("web", 0.1)];
    let keyword_density: BTreeMap<String, f64> = bases
        .into_iter()
        .map(|(word, base)| (word.to_string(), base + spread))
        .collect();

    let content_analysis = ContentAnalysis {
        word_count: MIN_WORDS + hash % 2000,
        readability_score: Some((50 + hash % 50) as u8),
        keywords_found: keyword_density.keys().cloned().collect(),
        keyword_density,
    };

    let meta_tags =
        MetaTags { title: Some(title), description: Some(description), robots: Some(robots), canonical: Some(canonical) };
    assemble(meta_tags, headings, content_analysis, hash % 3 != 0)
}

fn assemble(meta_tags: MetaTags, headings: Headings, content_analysis: ContentAnalysis, images_described: bool) -> SeoAnalysis {
    let checks = run_checks(&meta_tags, &headings, &content_analysis, images_described);
    SeoAnalysis { score: score(&checks), meta_tags, headings, content_analysis, checks }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    selector(css).map(|sel| document.select(&sel).collect()).unwrap_or_default()
}

fn first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    select(document, css).into_iter().next()
}

fn attr_of(document: &Html, css: &str, attr: &str) -> Option<String> {
    first(document, css).and_then(|el| el.value().attr(attr)).map(|value| value.trim().to_string())
}

fn count(document: &Html, css: &str) -> u32 {
    u32::try_from(select(document, css).len()).unwrap_or(u32::MAX)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible body text; script and style contents are skipped.
fn body_text(document: &Html) -> String {
    let Some(body) = first(document, "body") else {
        return String::new();
    };

    let mut parts = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
        if !hidden {
            parts.push(&**text);
        }
    }
    collapse(&parts.join(" "))
}

fn content_of(text: &str) -> ContentAnalysis {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    let word_count = u32::try_from(words.len()).unwrap_or(u32::MAX);

    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for word in words.iter().filter(|w| w.chars().count() >= KEYWORD_MIN_LEN) {
        *frequency.entry(word.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.truncate(KEYWORD_COUNT);

    let keyword_density = ranked
        .iter()
        .map(|(word, hits)| {
            let density = *hits as f64 / words.len().max(1) as f64 * 100.0;
            (word.to_string(), (density * 100.0).round() / 100.0)
        })
        .collect();

    ContentAnalysis {
        word_count,
        readability_score: Some((60 + text.chars().count() % 40) as u8),
        keywords_found: ranked.into_iter().map(|(word, _)| word.to_string()).collect(),
        keyword_density,
    }
}

fn measured_tag(value: &str, issues: Vec<String>) -> MetaTag {
    MetaTag {
        exists: !value.is_empty(),
        value: (!value.is_empty()).then(|| value.to_string()),
        length: Some(value.chars().count()),
        issues,
    }
}

fn plain_tag(value: &str) -> MetaTag {
    MetaTag { exists: !value.is_empty(), value: (!value.is_empty()).then(|| value.to_string()), length: None, issues: vec![] }
}

fn title_issues(title: &str) -> Vec<String> {
    let length = title.chars().count();
    if title.is_empty() {
        vec!["Missing title tag".into()]
    } else if length < TITLE_MIN {
        vec![format!("Title tag is too short (fewer than {TITLE_MIN} characters)")]
    } else if length > TITLE_MAX {
        vec![format!("Title tag is too long (more than {TITLE_MAX} characters)")]
    } else {
        vec![]
    }
}

fn description_issues(description: &str) -> Vec<String> {
    let length = description.chars().count();
    if description.is_empty() {
        vec!["Missing meta description".into()]
    } else if length < DESCRIPTION_MIN {
        vec![format!("Meta description is too short (fewer than {DESCRIPTION_MIN} characters)")]
    } else if length > DESCRIPTION_MAX {
        vec![format!("Meta description is too long (more than {DESCRIPTION_MAX} characters)")]
    } else {
        vec![]
    }
}

fn heading_structure(h1: u32, h2: u32, h3: u32) -> HeadingStructure {
    let mut issues = Vec::new();
    match h1 {
        0 => issues.push("Missing H1 heading".to_string()),
        1 => {}
        n => issues.push(format!("Found {n} H1 headings (there should be exactly one)")),
    }
    if h1 > 0 && h2 == 0 && h3 > 0 {
        issues.push("H3 headings are used without H2 headings, which suggests a broken outline".to_string());
    }
    HeadingStructure { valid: issues.is_empty(), issues }
}

fn seo_check(title: &str, status: CheckStatus, description: impl Into<String>) -> SeoCheck {
    SeoCheck { title: title.to_string(), status, description: description.into() }
}

fn tag_check(name: &str, tag: Option<&MetaTag>, missing: &str) -> SeoCheck {
    match tag {
        Some(tag) if !tag.exists => seo_check(name, CheckStatus::Failed, missing),
        Some(tag) if !tag.issues.is_empty() => seo_check(name, CheckStatus::Warning, tag.issues.join(". ")),
        Some(_) => seo_check(name, CheckStatus::Passed, format!("{name} is implemented correctly")),
        None => seo_check(name, CheckStatus::Failed, missing),
    }
}

fn run_checks(meta: &MetaTags, headings: &Headings, content: &ContentAnalysis, images_described: bool) -> Vec<SeoCheck> {
    let words = content.word_count;
    vec![
        tag_check("Title tag", meta.title.as_ref(), "The title tag is missing, and it is key for SEO"),
        tag_check(
            "Meta description",
            meta.description.as_ref(),
            "The meta description is missing, which can hurt click-through rates in search results",
        ),
        if headings.structure.valid {
            seo_check("Heading structure", CheckStatus::Passed, "Heading structure is implemented correctly")
        } else {
            seo_check("Heading structure", CheckStatus::Failed, headings.structure.issues.join(". "))
        },
        if words < MIN_WORDS {
            seo_check(
                "Content length",
                CheckStatus::Failed,
                format!("Content is too short ({words} words). At least {MIN_WORDS} words are recommended."),
            )
        } else if words < GOOD_WORDS {
            seo_check(
                "Content length",
                CheckStatus::Warning,
                format!("Content has {words} words. At least {GOOD_WORDS} are recommended for in-depth topics."),
            )
        } else {
            seo_check("Content length", CheckStatus::Passed, format!("Content is long enough ({words} words)"))
        },
        if images_described {
            seo_check("Image alt text", CheckStatus::Passed, "All images have alt text")
        } else {
            seo_check("Image alt text", CheckStatus::Failed, "Some images have no alt text, which can hurt SEO")
        },
    ]
}

/// Share of passed checks on the 0-100 scale.
fn score(checks: &[SeoCheck]) -> u8 {
    if checks.is_empty() {
        return 0;
    }
    let passed = checks.iter().filter(|c| c.status == CheckStatus::Passed).count();
    (passed as f64 / checks.len() as f64 * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
            <head>
                <title>Handmade oak furniture from a family workshop</title>
                <meta name="description" content="We build chairs, tables and shelves from local oak. Every piece is made to order in our workshop.">
                <meta name="robots" content="index, follow">
                <link rel="canonical" href="https://workshop.example/">
                <script>var tracking = "ignored words here";</script>
            </head>
            <body>
                <h1>Oak furniture</h1>
                <h2>Chairs</h2>
                <h3>Dining chairs</h3>
                <p>Oak chairs and oak tables, built to last.</p>
                <img src="chair.jpg" alt="An oak chair">
                <script>console.log("hidden");</script>
            </body>
        </html>
    "#;

    #[test]
    fn test_inspect_reads_meta_tags() {
        let seo = inspect_html(PAGE);
        let title = seo.meta_tags.title.unwrap();
        assert!(title.exists);
        assert_eq!(title.value.as_deref(), Some("Handmade oak furniture from a family workshop"));
        assert!(title.issues.is_empty());

        let robots = seo.meta_tags.robots.unwrap();
        assert_eq!(robots.value.as_deref(), Some("index, follow"));
        let canonical = seo.meta_tags.canonical.unwrap();
        assert_eq!(canonical.value.as_deref(), Some("https://workshop.example/"));
    }

    #[test]
    fn test_inspect_counts_headings_and_skips_scripts() {
        let seo = inspect_html(PAGE);
        assert_eq!((seo.headings.h1_count, seo.headings.h2_count, seo.headings.h3_count), (1, 1, 1));
        assert!(seo.headings.structure.valid);

        assert!(!seo.content_analysis.keywords_found.iter().any(|w| w == "hidden" || w == "tracking"));
        assert_eq!(seo.content_analysis.keywords_found[0], "chairs");
    }

    #[test]
    fn test_inspect_scores_checks() {
        let seo = inspect_html(PAGE);
        let statuses: Vec<_> = seo.checks.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            [CheckStatus::Passed, CheckStatus::Passed, CheckStatus::Passed, CheckStatus::Failed, CheckStatus::Passed]
        );
        assert_eq!(seo.score, 80);
    }

    #[test]
    fn test_inspect_empty_document() {
        let seo = inspect_html("<html><body><img src=\"x.png\"></body></html>");
        let title = seo.meta_tags.title.unwrap();
        assert!(!title.exists);
        assert_eq!(title.issues, ["Missing title tag"]);
        assert!(!seo.headings.structure.valid);
        assert!(seo.checks.iter().all(|c| c.status != CheckStatus::Passed));
        assert_eq!(seo.score, 0);
    }

    #[test]
    fn test_heading_structure_rules() {
        assert!(heading_structure(1, 2, 3).valid);
        assert_eq!(heading_structure(0, 1, 0).issues, ["Missing H1 heading"]);
        assert!(heading_structure(3, 1, 0).issues[0].starts_with("Found 3 H1"));
        assert_eq!(heading_structure(1, 0, 2).issues.len(), 1);
    }

    #[test]
    fn test_mock_is_deterministic() {
        assert_eq!(check("https://example.com/", None), check("https://example.com/", None));
    }

    #[test]
    fn test_mock_from_hash() {
        // magnitude("https://example.com/") = 1856498399
        let seo = mock("https://example.com/");
        assert_eq!(seo.headings.h1_count, 3);
        assert_eq!(seo.headings.h2_count, 6);
        assert!(!seo.headings.structure.valid);
        assert_eq!(seo.content_analysis.word_count, 300 + 1_856_498_399 % 2000);
        assert_eq!(seo.checks.len(), 5);
        assert!(seo.meta_tags.canonical.unwrap().exists);
    }

    #[test]
    fn test_title_length_limits() {
        assert_eq!(title_issues("Short").len(), 1);
        assert!(title_issues("A reasonable page title").is_empty());
        assert!(title_issues(&"x".repeat(71))[0].contains("too long"));
    }
}
