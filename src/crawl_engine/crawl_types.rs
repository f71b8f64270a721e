//! Core types for one monitor's crawl.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Monitor-fatal crawl failures.
///
/// Per-page failures past the seed are logged and skipped, so they never
/// surface here.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid monitor URL {url}: {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("seed page {url} could not be fetched: {reason}")]
    SeedUnreachable { url: String, reason: String },
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Represents an item in the crawl queue with URL and depth tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlQueue {
    pub url: String,
    /// 1 for the seed page.
    pub depth: u32,
}

/// What one successfully fetched page contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub url: String,
    /// Visible body text, whitespace-collapsed.
    pub text: String,
    /// Same-domain links found on the page. Empty when links were not
    /// followed from this depth.
    pub links: BTreeSet<String>,
}

/// All page texts of one run, keyed and rendered by URL.
///
/// Rendering by URL rather than fetch order keeps the stored text stable when
/// pages load in a different order between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedDocument {
    pages: BTreeMap<String, String>,
}

impl AggregatedDocument {
    pub fn insert(&mut self, page: PageResult) {
        self.pages.insert(page.url, page.text);
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Text to store and diff against.
    ///
    /// A single page renders as its bare text. Multiple pages render as
    /// `--- url ---` labeled blocks separated by blank lines.
    #[must_use]
    pub fn render(&self) -> String {
        if self.pages.len() == 1
            && let Some(text) = self.pages.values().next()
        {
            return text.clone();
        }

        self.pages
            .iter()
            .map(|(url, text)| format!("--- {url} ---\n{text}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
