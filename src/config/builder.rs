//! Fluent builder for `EngineConfig`
//!
//! Every field has a default, so `EngineConfig::builder().build()` is valid.
//! `build` rejects values that would stall or disable the engine.

use anyhow::{Result, anyhow};

use super::types::EngineConfig;
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_MAX_PAGES_PER_MONITOR, DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
    DEFAULT_POOL_SIZE, DEFAULT_SETTLE_TIMEOUT_SECS, DEFAULT_SUMMARIZER_BACKOFF_SECS,
    DEFAULT_SUMMARIZER_TIMEOUT_SECS, DIFF_CHAR_LIMIT,
};

#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    pool_size: usize,
    page_load_timeout_secs: u64,
    settle_timeout_secs: u64,
    max_pages_per_monitor: usize,
    diff_char_limit: usize,
    summarizer_backoff_ms: u64,
    summarizer_timeout_secs: u64,
    headless: bool,
    user_agent: String,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            settle_timeout_secs: DEFAULT_SETTLE_TIMEOUT_SECS,
            max_pages_per_monitor: DEFAULT_MAX_PAGES_PER_MONITOR,
            diff_char_limit: DIFF_CHAR_LIMIT,
            summarizer_backoff_ms: DEFAULT_SUMMARIZER_BACKOFF_SECS * 1000,
            summarizer_timeout_secs: DEFAULT_SUMMARIZER_TIMEOUT_SECS,
            headless: true,
            user_agent: CHROME_USER_AGENT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a builder for configuring an `EngineConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let defaults = EngineConfigBuilder::default();
        Self {
            pool_size: defaults.pool_size,
            page_load_timeout_secs: defaults.page_load_timeout_secs,
            settle_timeout_secs: defaults.settle_timeout_secs,
            max_pages_per_monitor: defaults.max_pages_per_monitor,
            diff_char_limit: defaults.diff_char_limit,
            summarizer_backoff_ms: defaults.summarizer_backoff_ms,
            summarizer_timeout_secs: defaults.summarizer_timeout_secs,
            headless: defaults.headless,
            user_agent: defaults.user_agent,
        }
    }
}

impl EngineConfigBuilder {
    #[must_use]
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn settle_timeout_secs(mut self, secs: u64) -> Self {
        self.settle_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_pages_per_monitor(mut self, max_pages: usize) -> Self {
        self.max_pages_per_monitor = max_pages;
        self
    }

    #[must_use]
    pub fn diff_char_limit(mut self, limit: usize) -> Self {
        self.diff_char_limit = limit;
        self
    }

    #[must_use]
    pub fn summarizer_backoff_ms(mut self, ms: u64) -> Self {
        self.summarizer_backoff_ms = ms;
        self
    }

    #[must_use]
    pub fn summarizer_timeout_secs(mut self, secs: u64) -> Self {
        self.summarizer_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<EngineConfig> {
        if self.pool_size == 0 {
            return Err(anyhow!("pool_size must be at least 1"));
        }
        if self.page_load_timeout_secs == 0 {
            return Err(anyhow!("page_load_timeout_secs must be at least 1"));
        }
        if self.summarizer_timeout_secs == 0 {
            return Err(anyhow!("summarizer_timeout_secs must be at least 1"));
        }
        if self.max_pages_per_monitor == 0 {
            return Err(anyhow!("max_pages_per_monitor must be at least 1"));
        }
        if self.diff_char_limit == 0 {
            return Err(anyhow!("diff_char_limit must be at least 1"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(anyhow!("user_agent must not be empty"));
        }

        Ok(EngineConfig {
            pool_size: self.pool_size,
            page_load_timeout_secs: self.page_load_timeout_secs,
            settle_timeout_secs: self.settle_timeout_secs,
            max_pages_per_monitor: self.max_pages_per_monitor,
            diff_char_limit: self.diff_char_limit,
            summarizer_backoff_ms: self.summarizer_backoff_ms,
            summarizer_timeout_secs: self.summarizer_timeout_secs,
            headless: self.headless,
            user_agent: self.user_agent,
        })
    }
}
