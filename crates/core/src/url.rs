//! URL canonicalization for consistent cache keys.
//!
//! Two inputs that name the same site (`www.example.com`, `example.com`,
//! `https://EXAMPLE.com/`) must land on the same cache key, so every entry
//! point runs user input through [`normalize_url`] first.

use url::Url;

/// Prefix for every audit cache key.
pub const CACHE_KEY_PREFIX: &str = "audit:";

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid report id: {0}")]
    InvalidReportId(String),
}

/// Canonicalize a URL string.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host and strip leading `www.` labels
/// 4. Remove fragment (#...)
/// 5. Keep path and query string intact
///
/// The function is idempotent: feeding its output back in yields the same URL.
pub fn normalize_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if has_scheme(trimmed) { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    let host = parsed.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    let mut bare = host.as_str();
    while let Some(rest) = bare.strip_prefix("www.")
        && !rest.is_empty()
    {
        bare = rest;
    }

    if bare != parsed.host_str().unwrap_or_default() {
        parsed
            .set_host(Some(bare))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether `input` opens with `scheme://`. A `://` later in the path or
/// query does not count.
fn has_scheme(input: &str) -> bool {
    input.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Cache key for a normalized URL.
pub fn cache_key(url: &Url) -> String {
    format!("{CACHE_KEY_PREFIX}{url}")
}

/// Extract the bare domain (no scheme, no `www.`) from user input.
///
/// Falls back to stripping the scheme textually when the input does not parse.
pub fn extract_domain(input: &str) -> String {
    match normalize_url(input) {
        Ok(url) => url.host_str().unwrap_or_default().to_string(),
        Err(_) => {
            let trimmed = input.trim();
            let rest = trimmed
                .strip_prefix("https://")
                .or_else(|| trimmed.strip_prefix("http://"))
                .unwrap_or(trimmed);
            rest.strip_prefix("www.").unwrap_or(rest).to_string()
        }
    }
}

/// Screenshot service URL for a canonical page URL.
pub fn screenshot_url(url: &str) -> String {
    format!(
        "https://api.microlink.io/?url={}&screenshot=true&meta=false&embed=screenshot.url",
        urlencoding::encode(url)
    )
}

/// 32-bit rolling string hash over UTF-16 code units (`h = h * 31 + c`, wrapping).
///
/// Stable across platforms; used for report ids and for seeding deterministic
/// mock analyzers.
pub fn string_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit)))
}

/// Build a shareable report id: eight hex chars of [`string_hash`], a dash,
/// and the percent-encoded URL.
pub fn generate_report_id(url: &str) -> String {
    let magnitude = i64::from(string_hash(url)).abs();
    let hex = format!("{magnitude:08x}");
    format!("{}-{}", &hex[..8], urlencoding::encode(url))
}

/// The URL part of a report id: everything after the first `-`, still in
/// whatever encoding the id arrived in.
pub fn report_id_target(id: &str) -> Result<&str, UrlError> {
    match id.split_once('-') {
        Some((_, target)) if !target.is_empty() => Ok(target),
        _ => Err(UrlError::InvalidReportId(id.to_string())),
    }
}

/// Recover the URL embedded in a report id produced by [`generate_report_id`].
///
/// Decodes once. Callers holding an id whose percent-encoding was already
/// undone (such as a decoded path segment) use [`report_id_target`] instead.
pub fn parse_report_id(id: &str) -> Result<String, UrlError> {
    let encoded = report_id_target(id)?;

    urlencoding::decode(encoded)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| UrlError::InvalidReportId(e.to_string()))
}
