//! Breadth-first crawl frontier
//!
//! FIFO queue of `(url, depth)` plus visited and queued sets. A URL is handed
//! out at most once per crawl, and children are only accepted while their
//! parent sits above the depth limit.

use std::collections::{HashSet, VecDeque};

use super::crawl_types::CrawlQueue;

#[derive(Debug)]
pub struct CrawlFrontier {
    queue: VecDeque<CrawlQueue>,
    visited: HashSet<String>,
    queued: HashSet<String>,
    max_depth: u32,
}

impl CrawlFrontier {
    /// Seed the frontier with `seed` at depth 1.
    #[must_use]
    pub fn new(seed: impl Into<String>, max_depth: u32) -> Self {
        let seed = seed.into();
        let mut queued = HashSet::new();
        queued.insert(seed.clone());
        Self {
            queue: VecDeque::from([CrawlQueue {
                url: seed,
                depth: 1,
            }]),
            visited: HashSet::new(),
            queued,
            max_depth: max_depth.max(1),
        }
    }

    /// Next unvisited item, marked visited on the way out.
    pub fn pop_next(&mut self) -> Option<CrawlQueue> {
        while let Some(item) = self.queue.pop_front() {
            self.queued.remove(&item.url);
            if self.visited.insert(item.url.clone()) {
                return Some(item);
            }
        }
        None
    }

    /// Whether links found at `depth` may still be followed.
    #[must_use]
    pub fn can_expand(&self, depth: u32) -> bool {
        depth < self.max_depth
    }

    /// Enqueue links discovered on a page at `parent_depth`.
    ///
    /// Returns how many were newly queued.
    pub fn enqueue_links<I>(&mut self, parent_depth: u32, links: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        if !self.can_expand(parent_depth) {
            return 0;
        }
        let mut added = 0;
        for url in links {
            if self.visited.contains(&url) || !self.queued.insert(url.clone()) {
                continue;
            }
            self.queue.push_back(CrawlQueue {
                url,
                depth: parent_depth + 1,
            });
            added += 1;
        }
        added
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
