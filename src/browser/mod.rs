//! Browsing contexts
//!
//! The engine drives pages through the [`BrowsingContext`] trait so the
//! crawl, session and orchestration logic never touch CDP directly. Each
//! monitor gets its own context from a [`ContextFactory`]; contexts are never
//! shared and every context owns a separate cookie jar.

pub mod chromium;
pub mod launch;
pub mod lifecycle;
pub mod page_helpers;

use anyhow::Result;
use async_trait::async_trait;

use crate::monitor::SessionCookie;

pub use chromium::{ChromiumContext, ChromiumContextFactory};
pub use launch::{download_managed_browser, find_browser_executable, launch_browser};
pub use lifecycle::{BrowserHandle, CleanupResult};

/// One isolated tab plus its cookie jar.
#[async_trait]
pub trait BrowsingContext: Send + Sync {
    /// Navigate to `url` and wait for the page to settle.
    ///
    /// Implementations bound the whole operation by their navigation timeout;
    /// a timeout is reported as an error.
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL currently displayed, after any redirects.
    async fn current_url(&self) -> Result<String>;

    /// Full rendered body text of the current page.
    async fn inner_text(&self) -> Result<String>;

    /// Absolute `href` values of every anchor on the current page.
    async fn hrefs(&self) -> Result<Vec<String>>;

    /// Type `value` into the first element matching `selector`.
    ///
    /// Returns `Ok(false)` when nothing matches.
    async fn fill(&self, selector: &str, value: &str) -> Result<bool>;

    /// Press Enter inside the element matching `selector` and wait for the
    /// resulting navigation to settle.
    async fn submit(&self, selector: &str) -> Result<()>;

    async fn add_cookies(&self, cookies: &[SessionCookie]) -> Result<()>;

    /// All cookies currently held by this context.
    async fn cookies(&self) -> Result<Vec<SessionCookie>>;

    /// Release the context. Failures are logged by the implementation.
    async fn close(self: Box<Self>);
}

/// Allocates one isolated [`BrowsingContext`] per monitor.
#[async_trait]
pub trait ContextFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowsingContext>>;
}
