//! Test utilities shared by the webwatcher integration tests
//!
//! `FakeSite` is an in-memory web: pages with text, links and optional login
//! forms. `FakeContextFactory` hands out browsing contexts over it and tracks
//! how many are open at once.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use webwatcher::browser::{BrowsingContext, ContextFactory};
use webwatcher::config::EngineConfig;
use webwatcher::monitor::{Monitor, NewMonitor, SessionCookie};
use webwatcher::notifier::{NotificationPayload, Notifier, NotifyError};
use webwatcher::store::{MonitorStore, MonitorUpdate, SqliteMonitorStore, StoreError};
use webwatcher::summarizer::Summarizer;
use webwatcher::utils::normalize_url;

fn key(url: &str) -> String {
    normalize_url(url).unwrap_or_else(|_| url.to_string())
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub text: String,
    pub links: Vec<String>,
    pub unreachable: bool,
    /// Selectors that exist on the page and accept input.
    pub fields: Vec<String>,
    /// Where pressing Enter in a field leads.
    pub after_submit: Option<String>,
    /// Cookies the server sets when the form is submitted.
    pub cookies_on_submit: Vec<SessionCookie>,
}

#[allow(dead_code)]
#[derive(Default)]
pub struct FakeSite {
    pages: Mutex<HashMap<String, FakePage>>,
    navigations: Mutex<Vec<String>>,
    filled: Mutex<Vec<(String, String)>>,
    injected: Mutex<Vec<SessionCookie>>,
}

#[allow(dead_code)]
impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, text: &str, links: &[&str]) -> Self {
        self.put(
            url,
            FakePage {
                text: text.to_string(),
                links: links.iter().map(|l| (*l).to_string()).collect(),
                ..FakePage::default()
            },
        );
        self
    }

    pub fn unreachable(self, url: &str) -> Self {
        self.put(
            url,
            FakePage {
                unreachable: true,
                ..FakePage::default()
            },
        );
        self
    }

    pub fn login_page(
        self,
        url: &str,
        text: &str,
        fields: &[&str],
        after_submit: &str,
        cookies_on_submit: Vec<SessionCookie>,
    ) -> Self {
        self.put(
            url,
            FakePage {
                text: text.to_string(),
                fields: fields.iter().map(|f| (*f).to_string()).collect(),
                after_submit: Some(after_submit.to_string()),
                cookies_on_submit,
                ..FakePage::default()
            },
        );
        self
    }

    pub fn put(&self, url: &str, page: FakePage) {
        self.pages.lock().unwrap().insert(key(url), page);
    }

    pub fn set_text(&self, url: &str, text: &str) {
        if let Some(page) = self.pages.lock().unwrap().get_mut(&key(url)) {
            page.text = text.to_string();
        }
    }

    fn get(&self, url: &str) -> Option<FakePage> {
        self.pages.lock().unwrap().get(&key(url)).cloned()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn navigation_count(&self, url: &str) -> usize {
        let wanted = key(url);
        self.navigations().iter().filter(|u| **u == wanted).count()
    }

    pub fn filled(&self) -> Vec<(String, String)> {
        self.filled.lock().unwrap().clone()
    }

    pub fn injected(&self) -> Vec<SessionCookie> {
        self.injected.lock().unwrap().clone()
    }
}

#[allow(dead_code)]
pub struct FakeContext {
    site: Arc<FakeSite>,
    current: Mutex<Option<String>>,
    jar: Mutex<Vec<SessionCookie>>,
    nav_delay: Duration,
    active: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FakeContext {
    fn current_page(&self) -> Result<FakePage> {
        let current = self
            .current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("no page loaded"))?;
        self.site
            .get(&current)
            .ok_or_else(|| anyhow!("page {current} vanished"))
    }
}

#[async_trait]
impl BrowsingContext for FakeContext {
    async fn goto(&self, url: &str) -> Result<()> {
        if !self.nav_delay.is_zero() {
            tokio::time::sleep(self.nav_delay).await;
        }
        let url = key(url);
        self.site.navigations.lock().unwrap().push(url.clone());
        match self.site.get(&url) {
            Some(page) if !page.unreachable => {
                *self.current.lock().unwrap() = Some(url);
                Ok(())
            }
            _ => Err(anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}")),
        }
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn inner_text(&self) -> Result<String> {
        Ok(self.current_page()?.text)
    }

    async fn hrefs(&self) -> Result<Vec<String>> {
        Ok(self.current_page()?.links)
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<bool> {
        let page = self.current_page()?;
        if page.fields.iter().any(|f| f == selector) {
            self.site
                .filled
                .lock()
                .unwrap()
                .push((selector.to_string(), value.to_string()));
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn submit(&self, selector: &str) -> Result<()> {
        let page = self.current_page()?;
        if !page.fields.iter().any(|f| f == selector) {
            return Err(anyhow!("submit target {selector} not found"));
        }
        self.jar.lock().unwrap().extend(page.cookies_on_submit.clone());
        if let Some(next) = page.after_submit {
            *self.current.lock().unwrap() = Some(key(&next));
        }
        Ok(())
    }

    async fn add_cookies(&self, cookies: &[SessionCookie]) -> Result<()> {
        self.jar.lock().unwrap().extend(cookies.iter().cloned());
        self.site.injected.lock().unwrap().extend(cookies.iter().cloned());
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        Ok(self.jar.lock().unwrap().clone())
    }

    async fn close(self: Box<Self>) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
pub struct FakeContextFactory {
    pub site: Arc<FakeSite>,
    pub nav_delay: Duration,
    pub fail_open: bool,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeContextFactory {
    pub fn new(site: Arc<FakeSite>) -> Self {
        Self {
            site,
            nav_delay: Duration::ZERO,
            fail_open: false,
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_nav_delay(mut self, delay: Duration) -> Self {
        self.nav_delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Concrete context for tests that drive components directly.
    pub fn context(&self) -> FakeContext {
        self.active.fetch_add(1, Ordering::SeqCst);
        FakeContext {
            site: Arc::clone(&self.site),
            current: Mutex::new(None),
            jar: Mutex::new(Vec::new()),
            nav_delay: self.nav_delay,
            active: Arc::clone(&self.active),
            closed: Arc::clone(&self.closed),
        }
    }
}

#[async_trait]
impl ContextFactory for FakeContextFactory {
    async fn open(&self) -> Result<Box<dyn BrowsingContext>> {
        if self.fail_open {
            return Err(anyhow!("browser context limit reached"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let context = self.context();
        let now_active = self.active.load(Ordering::SeqCst);
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        Ok(Box::new(context))
    }
}

/// Summarizer that replays scripted responses, then repeats `default`.
#[allow(dead_code)]
pub struct ScriptedSummarizer {
    script: Mutex<VecDeque<Result<String>>>,
    default: String,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedSummarizer {
    pub fn always(summary: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: summary.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, response: Result<String>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(self.default.clone()),
        }
    }
}

/// Summarizer that panics on every call.
#[allow(dead_code)]
pub struct PanickingSummarizer;

#[async_trait]
impl Summarizer for PanickingSummarizer {
    async fn summarize(&self, _prompt: &str) -> Result<String> {
        panic!("summarizer blew up")
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    sent: Mutex<Vec<NotificationPayload>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(NotifyError::Status(reqwest::StatusCode::BAD_GATEWAY));
        }
        Ok(())
    }
}

/// Store wrapper whose final-state writes always fail.
#[allow(dead_code)]
pub struct BrokenWritesStore {
    pub inner: Arc<SqliteMonitorStore>,
}

#[async_trait]
impl MonitorStore for BrokenWritesStore {
    async fn load_monitors(&self) -> Result<Vec<Monitor>, StoreError> {
        self.inner.load_monitors().await
    }

    async fn apply_update(&self, id: &str, update: &MonitorUpdate) -> Result<(), StoreError> {
        match update {
            MonitorUpdate::SessionCookies(_) => self.inner.apply_update(id, update).await,
            _ => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
        }
    }
}

/// In-memory store seeded with `monitors`; returns the stored records too.
#[allow(dead_code)]
pub async fn seeded_store(monitors: Vec<NewMonitor>) -> (Arc<SqliteMonitorStore>, Vec<Monitor>) {
    let store = SqliteMonitorStore::open_in_memory().await.unwrap();
    let mut stored = Vec::new();
    for monitor in monitors {
        stored.push(store.insert_monitor(monitor).await.unwrap());
    }
    (Arc::new(store), stored)
}

/// Engine config with no retry backoff so tests never sleep.
#[allow(dead_code)]
pub fn fast_config(pool_size: usize) -> EngineConfig {
    EngineConfig::builder()
        .pool_size(pool_size)
        .summarizer_backoff_ms(0)
        .summarizer_timeout_secs(5)
        .build()
        .unwrap()
}
