//! Per-monitor breadth-first crawler
//!
//! One crawl reuses a single browsing context and walks pages strictly in
//! sequence: seed first, then same-host links level by level until the depth
//! limit or the page cap is reached.

use log::{debug, info, warn};

use super::crawl_types::{AggregatedDocument, CrawlError, CrawlQueue, CrawlResult, PageResult};
use super::frontier::CrawlFrontier;
use super::link_processor::collect_page_links;
use crate::browser::BrowsingContext;
use crate::monitor::Monitor;
use crate::utils::{collapse_whitespace, host_of, is_valid_url, normalize_url};

#[derive(Debug, Clone)]
pub struct PageCrawler {
    max_pages: usize,
}

impl PageCrawler {
    #[must_use]
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }

    /// Crawl `monitor` and aggregate the text of every page reached.
    ///
    /// `start_page_loaded` means the context already shows the seed page
    /// (after a login), so the seed is read without navigating again. Only a
    /// seed failure fails the crawl.
    pub async fn crawl(
        &self,
        context: &dyn BrowsingContext,
        monitor: &Monitor,
        start_page_loaded: bool,
    ) -> CrawlResult<AggregatedDocument> {
        let seed = seed_url(&monitor.url)?;
        let seed_host = host_of(&seed).ok_or_else(|| CrawlError::InvalidSeed {
            url: monitor.url.clone(),
            reason: "URL has no host".to_string(),
        })?;

        let mut frontier = CrawlFrontier::new(seed.clone(), monitor.max_depth());
        let mut document = AggregatedDocument::default();

        while let Some(item) = frontier.pop_next() {
            if document.page_count() >= self.max_pages {
                info!(
                    target: "webwatcher::crawl",
                    "Reached page cap of {} for {}, {} queued pages skipped",
                    self.max_pages,
                    monitor.url,
                    frontier.pending() + 1
                );
                break;
            }

            let is_seed = item.url == seed;
            let follow_links = monitor.deep_crawl && frontier.can_expand(item.depth);

            match self
                .fetch_page(context, &item, is_seed && start_page_loaded, follow_links, &seed_host)
                .await
            {
                Ok(page) => {
                    let added = frontier.enqueue_links(item.depth, page.links.iter().cloned());
                    debug!(
                        target: "webwatcher::crawl",
                        "Fetched {} (depth {}), queued {added} new links",
                        item.url,
                        item.depth
                    );
                    document.insert(page);
                }
                Err(e) if is_seed => {
                    return Err(CrawlError::SeedUnreachable {
                        url: item.url,
                        reason: format!("{e:#}"),
                    });
                }
                Err(e) => {
                    warn!(
                        target: "webwatcher::crawl",
                        "Skipping {} (depth {}): {e:#}",
                        item.url,
                        item.depth
                    );
                }
            }
        }

        info!(
            target: "webwatcher::crawl",
            "Crawled {} page(s) for {}",
            document.page_count(),
            monitor.url
        );
        Ok(document)
    }

    async fn fetch_page(
        &self,
        context: &dyn BrowsingContext,
        item: &CrawlQueue,
        already_loaded: bool,
        follow_links: bool,
        seed_host: &str,
    ) -> anyhow::Result<PageResult> {
        if !already_loaded {
            context.goto(&item.url).await?;
        }

        let text = collapse_whitespace(&context.inner_text().await?);
        let links = if follow_links {
            collect_page_links(context, &item.url, seed_host).await
        } else {
            Default::default()
        };

        Ok(PageResult {
            url: item.url.clone(),
            text,
            links,
        })
    }
}

fn seed_url(raw: &str) -> CrawlResult<String> {
    let raw = raw.trim();
    if !is_valid_url(raw) {
        return Err(CrawlError::InvalidSeed {
            url: raw.to_string(),
            reason: "expected an absolute http(s) URL".to_string(),
        });
    }
    normalize_url(raw).map_err(|e| CrawlError::InvalidSeed {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
