//! Shared configuration constants for webwatcher
//!
//! Default values used by the engine configuration and the collaborators,
//! kept in one place to avoid magic numbers.

/// Default number of monitors processed concurrently.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Default navigation timeout: 60 seconds
///
/// Covers slow login redirects and pages that keep loading long after the
/// first paint. A timeout counts as a page failure, not a monitor failure.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 60;

/// Upper bound for the post-navigation settle wait.
pub const DEFAULT_SETTLE_TIMEOUT_SECS: u64 = 10;

/// Default per-monitor page cap for deep crawls.
pub const DEFAULT_MAX_PAGES_PER_MONITOR: usize = 50;

/// Character ceiling for a rendered diff sent to the summarizer.
pub const DIFF_CHAR_LIMIT: usize = 15_000;

/// Delay before the single summarization retry.
pub const DEFAULT_SUMMARIZER_BACKOFF_SECS: u64 = 2;

/// Per-attempt summarization timeout.
pub const DEFAULT_SUMMARIZER_TIMEOUT_SECS: u64 = 60;

/// Timeout for the notification webhook POST.
pub const NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Chrome user agent string presented by every browsing context
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
