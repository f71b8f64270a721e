//! Session seeding and generic form login
//!
//! Before a crawl, the session manager loads whatever cookies the monitor
//! carries into its browsing context and, for monitors behind a login, drives
//! a generic username/password form. Cookies captured after a login are
//! written back so later runs can skip the form entirely.
//!
//! Nothing in here fails the monitor: every problem is logged and the crawl
//! proceeds, unauthenticated if need be.

pub mod login;

use std::sync::Arc;

use log::{debug, info, warn};

use crate::browser::BrowsingContext;
use crate::monitor::{Monitor, SessionCookie};
use crate::store::{MonitorStore, MonitorUpdate};
use crate::utils::host_of;

pub use login::{PASSWORD_SELECTORS, USERNAME_SELECTORS, perform_login};

/// Result of preparing a monitor's session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOutcome {
    /// The context already displays the monitor URL, so the crawler may read
    /// the seed page without navigating.
    pub start_page_loaded: bool,
    /// Cookies read back after a login attempt (empty when none were captured).
    pub captured_cookies: Vec<SessionCookie>,
    /// Number of cookies injected before navigation.
    pub injected: usize,
}

pub struct SessionManager {
    store: Arc<dyn MonitorStore>,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn MonitorStore>) -> Self {
        Self { store }
    }

    pub async fn prepare(&self, context: &dyn BrowsingContext, monitor: &Monitor) -> SessionOutcome {
        let mut outcome = SessionOutcome::default();
        let mut captured_injected = false;

        if let Some(payload) = monitor.cookie_payload() {
            let from_capture = payload.is_captured();
            match payload.into_cookies() {
                Ok(cookies) => {
                    let cookies = scope_to_host(cookies, &monitor.url);
                    match context.add_cookies(&cookies).await {
                        Ok(()) => {
                            info!(
                                target: "webwatcher::session",
                                "Injected {} {} cookie(s) for monitor {}",
                                cookies.len(),
                                if from_capture { "captured" } else { "manual" },
                                monitor.id
                            );
                            outcome.injected = cookies.len();
                            captured_injected = from_capture;
                        }
                        Err(e) => warn!(
                            target: "webwatcher::session",
                            "Failed to inject cookies for monitor {}: {e:#}",
                            monitor.id
                        ),
                    }
                }
                Err(e) => warn!(
                    target: "webwatcher::session",
                    "Ignoring cookie payload for monitor {}: {e}",
                    monitor.id
                ),
            }
        }

        if monitor.requires_login && !captured_injected {
            match perform_login(context, monitor).await {
                Ok(()) => {
                    info!(target: "webwatcher::session", "Login completed for monitor {}", monitor.id);
                    outcome.start_page_loaded = true;
                }
                Err(e) => warn!(
                    target: "webwatcher::session",
                    "Login failed for monitor {}, continuing unauthenticated: {e:#}",
                    monitor.id
                ),
            }
            // Captured even after a failed login, so an injected manual jar
            // becomes the captured jar and later runs skip the form.
            outcome.captured_cookies = self.capture_cookies(context, monitor).await;
        }

        outcome
    }

    /// Read the context's cookie jar and persist it as the monitor's captured
    /// cookies. An empty jar is not persisted.
    async fn capture_cookies(
        &self,
        context: &dyn BrowsingContext,
        monitor: &Monitor,
    ) -> Vec<SessionCookie> {
        let cookies = match context.cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!(
                    target: "webwatcher::session",
                    "Failed to read cookies for monitor {}: {e:#}",
                    monitor.id
                );
                return Vec::new();
            }
        };

        if cookies.is_empty() {
            debug!(target: "webwatcher::session", "No cookies to capture for monitor {}", monitor.id);
            return cookies;
        }

        match self
            .store
            .apply_update(&monitor.id, &MonitorUpdate::SessionCookies(cookies.clone()))
            .await
        {
            Ok(()) => info!(
                target: "webwatcher::session",
                "Captured {} cookie(s) for monitor {}",
                cookies.len(),
                monitor.id
            ),
            Err(e) => warn!(
                target: "webwatcher::session",
                "Failed to persist captured cookies for monitor {}: {e}",
                monitor.id
            ),
        }
        cookies
    }
}

/// Give domain-less cookies the monitor's host so the browser accepts them.
fn scope_to_host(cookies: Vec<SessionCookie>, monitor_url: &str) -> Vec<SessionCookie> {
    let host = host_of(monitor_url);
    cookies
        .into_iter()
        .map(|mut cookie| {
            if cookie.domain.as_deref().is_none_or(|d| d.trim().is_empty()) {
                cookie.domain = host.clone();
            }
            cookie
        })
        .collect()
}
