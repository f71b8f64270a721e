//! Same-domain link extraction
//!
//! Turns the raw anchors of a rendered page into the set of crawlable links:
//! resolved against the page URL, http(s) only, fragment stripped, query
//! kept, and restricted to the seed's exact host.

use std::collections::BTreeSet;

use log::{debug, trace, warn};
use url::Url;

use crate::browser::BrowsingContext;

/// Filter `hrefs` found on `base_url` down to crawlable same-host links.
#[must_use]
pub fn extract_same_domain_links(
    base_url: &str,
    hrefs: &[String],
    seed_host: &str,
) -> BTreeSet<String> {
    let base = Url::parse(base_url).ok();
    let mut links = BTreeSet::new();

    for href in hrefs {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        let resolved = match &base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        let Ok(mut url) = resolved else {
            trace!(target: "webwatcher::links", "Skipping unparseable href {href}");
            continue;
        };

        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        if url.host_str() != Some(seed_host) {
            continue;
        }

        url.set_fragment(None);
        links.insert(url.to_string());
    }

    links
}

/// Read the anchors of the context's current page and filter them.
///
/// Extraction failures are logged and yield no links; they never fail the
/// page.
pub async fn collect_page_links(
    context: &dyn BrowsingContext,
    page_url: &str,
    seed_host: &str,
) -> BTreeSet<String> {
    let base = match context.current_url().await {
        Ok(current) if current != "about:blank" => current,
        _ => page_url.to_string(),
    };

    match context.hrefs().await {
        Ok(hrefs) => {
            let links = extract_same_domain_links(&base, &hrefs, seed_host);
            debug!(
                target: "webwatcher::links",
                "Found {} links on {page_url}, {} after filtering",
                hrefs.len(),
                links.len()
            );
            links
        }
        Err(e) => {
            warn!(
                target: "webwatcher::links",
                "Failed to extract links from {page_url}: {e}"
            );
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hrefs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn keeps_only_exact_host_http_links() {
        let links = extract_same_domain_links(
            "https://x.com/start",
            &hrefs(&[
                "https://x.com/a",
                "https://blog.x.com/post",
                "https://y.com/",
                "mailto:team@x.com",
                "javascript:void(0)",
                "ftp://x.com/file",
            ]),
            "x.com",
        );
        assert_eq!(links.into_iter().collect::<Vec<_>>(), vec!["https://x.com/a"]);
    }

    #[test]
    fn resolves_relative_links_and_strips_fragments() {
        let links = extract_same_domain_links(
            "https://x.com/docs/intro",
            &hrefs(&["guide?lang=en#setup", "/about#team", "#top", ""]),
            "x.com",
        );
        assert_eq!(
            links.into_iter().collect::<Vec<_>>(),
            vec!["https://x.com/about", "https://x.com/docs/guide?lang=en"]
        );
    }

    #[test]
    fn fragment_variants_collapse_to_one_link() {
        let links = extract_same_domain_links(
            "https://x.com/",
            &hrefs(&["https://x.com/p#one", "https://x.com/p#two", "https://x.com/p"]),
            "x.com",
        );
        assert_eq!(links.len(), 1);
    }
}
