//! Getter methods for `EngineConfig`

use std::time::Duration;

use super::types::EngineConfig;

impl EngineConfig {
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    #[must_use]
    pub fn page_load_timeout_secs(&self) -> u64 {
        self.page_load_timeout_secs
    }

    #[must_use]
    pub fn settle_timeout_secs(&self) -> u64 {
        self.settle_timeout_secs
    }

    #[must_use]
    pub fn max_pages_per_monitor(&self) -> usize {
        self.max_pages_per_monitor
    }

    #[must_use]
    pub fn diff_char_limit(&self) -> usize {
        self.diff_char_limit
    }

    #[must_use]
    pub fn summarizer_backoff(&self) -> Duration {
        Duration::from_millis(self.summarizer_backoff_ms)
    }

    #[must_use]
    pub fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.summarizer_timeout_secs)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
