//! Helpers for chromiumoxide `Page` operations that may fail or return
//! nothing yet.

use chromiumoxide::page::Page;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const READY_STATE_SCRIPT: &str = r#"
    (function() {
        return {
            readyState: document.readyState,
            imagesLoaded: Array.from(document.images).every(img => img.complete),
            bodyExists: document.body !== null
        };
    })()
"#;

/// Get page URL with diagnostic fallback
///
/// Returns `"about:blank"` when the browser cannot be reached or the page has
/// not navigated yet.
pub async fn get_page_url_with_fallback(page: &Page) -> String {
    match page.url().await {
        Ok(Some(url)) => url,
        Ok(None) => {
            trace!("Page URL is None (page not yet navigated)");
            "about:blank".to_string()
        }
        Err(e) => {
            trace!("Failed to get page URL (browser communication error): {e}");
            "about:blank".to_string()
        }
    }
}

/// Wait until `document.readyState` is `complete` and a body exists.
///
/// Gives up quietly after `max_wait_secs`; a page that never settles is still
/// read as-is. Adds a short pause when images are still loading so late text
/// has a chance to render.
pub async fn wait_for_page_settle(page: &Page, max_wait_secs: u64) {
    let start = Instant::now();
    let max_wait = Duration::from_secs(max_wait_secs);
    let poll_interval = Duration::from_millis(100);

    loop {
        if start.elapsed() >= max_wait {
            warn!("Page did not settle within {max_wait_secs}s, proceeding anyway");
            return;
        }

        if let Ok(result) = page.evaluate(READY_STATE_SCRIPT).await
            && let Ok(value) = result.into_value::<serde_json::Value>()
        {
            let ready_state = value.get("readyState").and_then(|v| v.as_str());
            let body_exists = value
                .get("bodyExists")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            let images_loaded = value
                .get("imagesLoaded")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);

            if ready_state == Some("complete") && body_exists {
                debug!(
                    "Page settled after {:.2}s (images loaded: {images_loaded})",
                    start.elapsed().as_secs_f64()
                );
                if !images_loaded {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
                return;
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}
