//! chromiumoxide-backed browsing contexts
//!
//! Each [`ChromiumContext`] is a CDP browser context (an incognito-style
//! profile with its own cookie jar) holding exactly one page. Cookies are set
//! and read through the `Storage` domain scoped to that browser context, so
//! concurrent monitors never see each other's sessions.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Browser;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie, CookieParam, CookieSameSite, TimeSinceEpoch,
};
use chromiumoxide::cdp::browser_protocol::storage::{GetCookiesParams, SetCookiesParams};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page;
use tracing::{debug, warn};

use super::page_helpers::{get_page_url_with_fallback, wait_for_page_settle};
use super::{BrowsingContext, ContextFactory};
use crate::config::EngineConfig;
use crate::crawl_engine::page_timeout::with_page_timeout;
use crate::monitor::SessionCookie;

const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";
const HREFS_SCRIPT: &str = "Array.from(document.querySelectorAll('a[href]'), a => a.href)";

/// Opens one isolated browser context per call on a shared browser process.
pub struct ChromiumContextFactory {
    browser: Arc<Browser>,
    page_load_timeout_secs: u64,
    settle_timeout_secs: u64,
}

impl ChromiumContextFactory {
    #[must_use]
    pub fn new(browser: Arc<Browser>, config: &EngineConfig) -> Self {
        Self {
            browser,
            page_load_timeout_secs: config.page_load_timeout_secs(),
            settle_timeout_secs: config.settle_timeout_secs(),
        }
    }
}

#[async_trait]
impl ContextFactory for ChromiumContextFactory {
    async fn open(&self) -> Result<Box<dyn BrowsingContext>> {
        let created = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .context("Failed to create browser context")?;
        let context_id = created.result.browser_context_id.clone();

        let mut target = CreateTargetParams::new("about:blank");
        target.browser_context_id = Some(context_id.clone());

        let page = match self.browser.new_page(target).await {
            Ok(page) => page,
            Err(e) => {
                dispose_context(&self.browser, &context_id).await;
                return Err(anyhow::Error::new(e).context("Failed to open page in browser context"));
            }
        };

        debug!("Opened browser context {context_id:?}");
        Ok(Box::new(ChromiumContext {
            browser: Arc::clone(&self.browser),
            context_id,
            page,
            page_load_timeout_secs: self.page_load_timeout_secs,
            settle_timeout_secs: self.settle_timeout_secs,
        }))
    }
}

pub struct ChromiumContext {
    browser: Arc<Browser>,
    context_id: BrowserContextId,
    page: Page,
    page_load_timeout_secs: u64,
    settle_timeout_secs: u64,
}

#[async_trait]
impl BrowsingContext for ChromiumContext {
    async fn goto(&self, url: &str) -> Result<()> {
        with_page_timeout(
            async {
                self.page
                    .goto(url)
                    .await
                    .with_context(|| format!("Failed to navigate to {url}"))?;
                wait_for_page_settle(&self.page, self.settle_timeout_secs).await;
                Ok(())
            },
            self.page_load_timeout_secs,
            "Page navigation",
        )
        .await
    }

    async fn current_url(&self) -> Result<String> {
        Ok(get_page_url_with_fallback(&self.page).await)
    }

    async fn inner_text(&self) -> Result<String> {
        self.page
            .evaluate(BODY_TEXT_SCRIPT)
            .await
            .context("Failed to evaluate body text")?
            .into_value::<String>()
            .context("Body text was not a string")
    }

    async fn hrefs(&self) -> Result<Vec<String>> {
        self.page
            .evaluate(HREFS_SCRIPT)
            .await
            .context("Failed to collect anchors")?
            .into_value::<Vec<String>>()
            .context("Anchor list was not an array of strings")
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<bool> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(false);
        };
        element
            .click()
            .await
            .with_context(|| format!("Failed to focus {selector}"))?;
        element
            .type_str(value)
            .await
            .with_context(|| format!("Failed to type into {selector}"))?;
        Ok(true)
    }

    async fn submit(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("Submit target {selector} not found"))?;
        element
            .press_key("Enter")
            .await
            .context("Failed to press Enter")?;

        with_page_timeout(
            async {
                self.page
                    .wait_for_navigation()
                    .await
                    .context("Navigation after submit failed")?;
                wait_for_page_settle(&self.page, self.settle_timeout_secs).await;
                Ok(())
            },
            self.page_load_timeout_secs,
            "Login submit",
        )
        .await
    }

    async fn add_cookies(&self, cookies: &[SessionCookie]) -> Result<()> {
        if cookies.is_empty() {
            return Ok(());
        }
        let mut params = SetCookiesParams::new(cookies.iter().map(to_cookie_param).collect());
        params.browser_context_id = Some(self.context_id.clone());
        self.browser
            .execute(params)
            .await
            .context("Failed to set cookies")?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        let mut params = GetCookiesParams::default();
        params.browser_context_id = Some(self.context_id.clone());
        let response = self
            .browser
            .execute(params)
            .await
            .context("Failed to read cookies")?;
        Ok(response.result.cookies.iter().map(from_cdp_cookie).collect())
    }

    async fn close(self: Box<Self>) {
        let ChromiumContext {
            browser,
            context_id,
            page,
            ..
        } = *self;
        if let Err(e) = page.close().await {
            warn!("Failed to close page: {e}");
        }
        dispose_context(&browser, &context_id).await;
    }
}

async fn dispose_context(browser: &Browser, context_id: &BrowserContextId) {
    if let Err(e) = browser
        .execute(DisposeBrowserContextParams::new(context_id.clone()))
        .await
    {
        warn!("Failed to dispose browser context {context_id:?}: {e}");
    }
}

fn to_cookie_param(cookie: &SessionCookie) -> CookieParam {
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    param.domain = cookie.domain.clone();
    param.path = cookie.path.clone();
    param.secure = cookie.secure;
    param.http_only = cookie.http_only;
    param.expires = cookie.persistent_expiry().map(TimeSinceEpoch::new);
    param.same_site = cookie.same_site.as_deref().and_then(parse_same_site);
    param
}

fn from_cdp_cookie(cookie: &Cookie) -> SessionCookie {
    SessionCookie {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        domain: Some(cookie.domain.clone()),
        path: Some(cookie.path.clone()),
        expires: Some(cookie.expires),
        http_only: Some(cookie.http_only),
        secure: Some(cookie.secure),
        same_site: cookie.same_site.as_ref().map(|site| {
            match site {
                CookieSameSite::Strict => "Strict",
                CookieSameSite::Lax => "Lax",
                CookieSameSite::None => "None",
            }
            .to_string()
        }),
    }
}

fn parse_same_site(raw: &str) -> Option<CookieSameSite> {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => Some(CookieSameSite::Strict),
        "lax" => Some(CookieSameSite::Lax),
        "none" | "no_restriction" => Some(CookieSameSite::None),
        _ => None,
    }
}
