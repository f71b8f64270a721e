//! Core configuration types for the watch engine
//!
//! `EngineConfig` carries the tunables of one run: pool size, timeouts and
//! crawl bounds. Process-level settings (database URL, API keys, webhook
//! endpoint) live in [`super::settings::Settings`].

use serde::{Deserialize, Serialize};

/// Tunables for one engine run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of monitors processed concurrently. Each active monitor owns
    /// one isolated browsing context, so this also bounds open contexts.
    ///
    /// Default: 5
    pub(crate) pool_size: usize,

    /// Timeout in seconds for one navigation, including the settle wait.
    ///
    /// Default: 60 seconds
    pub(crate) page_load_timeout_secs: u64,

    /// Upper bound in seconds for waiting on `document.readyState` after
    /// navigation.
    ///
    /// Default: 10 seconds
    pub(crate) settle_timeout_secs: u64,

    /// Hard cap on pages fetched for a single monitor, on top of the depth
    /// limit.
    ///
    /// Default: 50
    pub(crate) max_pages_per_monitor: usize,

    /// Character ceiling for the rendered diff handed to the summarizer.
    ///
    /// Default: 15,000
    pub(crate) diff_char_limit: usize,

    /// Delay in milliseconds before the single summarization retry.
    ///
    /// Default: 2,000 ms
    pub(crate) summarizer_backoff_ms: u64,

    /// Timeout in seconds for each summarization attempt.
    ///
    /// Default: 60 seconds
    pub(crate) summarizer_timeout_secs: u64,

    pub(crate) headless: bool,
    pub(crate) user_agent: String,
}
