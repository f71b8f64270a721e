//! Browser process lifecycle
//!
//! [`BrowserHandle`] owns the browser, its CDP handler task and the temporary
//! profile directory. Context factories borrow the browser through an `Arc`;
//! once they are dropped, `shutdown` can close the process cleanly.

use anyhow::Result;
use chromiumoxide::Browser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

pub struct BrowserHandle {
    browser: Option<Arc<Browser>>,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserHandle {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser: Some(Arc::new(browser)),
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    /// Shared browser for context factories.
    pub fn browser(&self) -> Result<Arc<Browser>> {
        self.browser
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Browser has already been shut down"))
    }

    /// Close the browser, wait for the process to exit, stop the handler and
    /// remove the profile directory.
    ///
    /// Every step is attempted even when an earlier one fails.
    pub async fn shutdown(mut self) -> CleanupResult {
        let mut errors = Vec::new();

        match self.browser.take().map(Arc::try_unwrap) {
            Some(Ok(mut browser)) => {
                debug!("Closing browser");
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {e}");
                    errors.push(format!("Browser close failed: {e}"));
                }
                if let Err(e) = browser.wait().await {
                    warn!("Failed to wait for browser exit: {e}");
                    errors.push(format!("Browser wait failed: {e}"));
                }
            }
            Some(Err(_)) => {
                warn!("Browser still shared at shutdown; relying on process kill on drop");
                errors.push("Browser still referenced by a context factory".to_string());
            }
            None => {}
        }

        self.handler.abort();

        if let Some(dir) = self.user_data_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!("Failed to clean up Chrome data directory {}: {e}", dir.display());
                errors.push(format!("Directory cleanup failed: {e}"));
            } else {
                debug!("Chrome data directory cleaned up: {}", dir.display());
            }
        }

        if errors.is_empty() {
            info!("Browser shut down cleanly");
            CleanupResult::Success
        } else {
            CleanupResult::PartialFailure(errors)
        }
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.handler.abort();
        if let Some(dir) = self.user_data_dir.take() {
            warn!("BrowserHandle dropped without shutdown - removing temp dir in Drop");
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!(
                    "Failed to clean up temp directory {}: {e}. Manual cleanup may be required.",
                    dir.display()
                );
            }
        }
    }
}
