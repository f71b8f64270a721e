//! URL helpers shared by the crawler, the link extractor and the session
//! manager.

use anyhow::Result;
use url::Url;

/// Check if a URL is an absolute http(s) URL.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Normalize a URL string by stripping its fragment.
///
/// Fragments are client-side markers, so `page#a` and `page#b` are the same
/// resource for crawling purposes. The query string is preserved.
///
/// ```
/// # use webwatcher::utils::url_utils::normalize_url;
/// assert_eq!(
///     normalize_url("https://example.com/page?x=1#section").unwrap(),
///     "https://example.com/page?x=1"
/// );
/// ```
pub fn normalize_url(url: &str) -> Result<String> {
    let mut parsed = Url::parse(url)
        .map_err(|e| anyhow::anyhow!("Failed to parse URL for normalization: {e}"))?;
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

/// Host of an absolute URL, if it has one.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
}

/// Whether two URLs point at the same resource once fragments are ignored.
///
/// Falls back to plain string comparison when either side does not parse.
#[must_use]
pub fn same_resource(a: &str, b: &str) -> bool {
    match (normalize_url(a), normalize_url(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
