//! Crawl Engine Module
//!
//! Breadth-first traversal of one monitor's pages: the frontier, link
//! filtering, timeouts and the aggregated result.

pub mod crawl_types;
pub mod crawler;
pub mod frontier;
pub mod link_processor;
pub mod page_timeout;

pub use crawl_types::{AggregatedDocument, CrawlError, CrawlQueue, CrawlResult, PageResult};
pub use crawler::PageCrawler;
pub use frontier::CrawlFrontier;
pub use link_processor::{collect_page_links, extract_same_domain_links};
pub use page_timeout::with_page_timeout;
