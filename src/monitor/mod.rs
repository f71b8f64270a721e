//! Monitor records
//!
//! A [`Monitor`] is the long-lived configuration and state of one watched
//! page. The store owns it; the engine reads it at the start of a run and
//! writes back at most one state update per run plus, after a login, the
//! captured session cookies.

pub mod cookies;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::redact;

pub use cookies::{CookieParseError, CookiePayload, SessionCookie, parse_manual_cookies};

/// Placeholder summary stored for monitors that have never been processed.
pub const PENDING_SUMMARY: &str = "Pending first run...";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: String,
    pub url: String,
    pub user_email: String,
    pub is_first_run: bool,
    pub deep_crawl: bool,
    /// Maximum BFS depth when `deep_crawl` is on. The seed is depth 1.
    pub deep_crawl_depth: u32,
    pub requires_login: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Manually supplied cookie payload (JSON text as entered by the owner).
    pub captcha_json: Option<String>,
    /// Cookies captured after an automated login. Empty means "none captured".
    #[serde(default)]
    pub auto_cookies: Vec<SessionCookie>,
    #[serde(default)]
    pub last_scraped_text: String,
    pub latest_ai_summary: Option<String>,
    pub ai_focus_note: Option<String>,
    pub email_notifications_enabled: bool,
    pub telegram_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
    pub last_updated_timestamp: Option<DateTime<Utc>>,
}

// Passwords and cookie payloads stay out of logs.
impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("user_email", &self.user_email)
            .field("is_first_run", &self.is_first_run)
            .field("deep_crawl", &self.deep_crawl)
            .field("deep_crawl_depth", &self.deep_crawl_depth)
            .field("requires_login", &self.requires_login)
            .field("username", &self.username)
            .field("password", &redact(self.password.as_deref()))
            .field("captcha_json", &redact(self.captcha_json.as_deref()))
            .field("auto_cookies", &self.auto_cookies)
            .field("last_scraped_text_len", &self.last_scraped_text.len())
            .field("latest_ai_summary", &self.latest_ai_summary)
            .field("ai_focus_note", &self.ai_focus_note)
            .field("email_notifications_enabled", &self.email_notifications_enabled)
            .field("telegram_notifications_enabled", &self.telegram_notifications_enabled)
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("last_updated_timestamp", &self.last_updated_timestamp)
            .finish()
    }
}

impl Monitor {
    /// Effective crawl depth: the configured depth for deep crawls, 1 otherwise.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        if self.deep_crawl {
            self.deep_crawl_depth.max(1)
        } else {
            1
        }
    }

    /// Pick the cookie source that governs this run.
    ///
    /// Captured cookies supersede the manual payload once present.
    #[must_use]
    pub fn cookie_payload(&self) -> Option<CookiePayload> {
        if !self.auto_cookies.is_empty() {
            return Some(CookiePayload::Captured(self.auto_cookies.clone()));
        }
        self.captcha_json
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| CookiePayload::RawManual(raw.to_string()))
    }

    /// Trimmed focus note, if the owner wrote one.
    #[must_use]
    pub fn focus_note(&self) -> Option<&str> {
        self.ai_focus_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }

    /// Credentials, when both are present and non-blank.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.trim().is_empty() && !pass.is_empty() => {
                Some((user, pass))
            }
            _ => None,
        }
    }
}

/// Fields accepted when registering a new monitor.
///
/// Engine-owned state starts at its first-run defaults.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NewMonitor {
    pub url: String,
    pub user_email: String,
    pub deep_crawl: bool,
    pub deep_crawl_depth: Option<u32>,
    pub requires_login: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub captcha_json: Option<String>,
    pub ai_focus_note: Option<String>,
    pub email_notifications_enabled: bool,
    pub telegram_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
}

impl fmt::Debug for NewMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewMonitor")
            .field("url", &self.url)
            .field("user_email", &self.user_email)
            .field("deep_crawl", &self.deep_crawl)
            .field("deep_crawl_depth", &self.deep_crawl_depth)
            .field("requires_login", &self.requires_login)
            .field("username", &self.username)
            .field("password", &redact(self.password.as_deref()))
            .field("captcha_json", &redact(self.captcha_json.as_deref()))
            .finish_non_exhaustive()
    }
}

impl NewMonitor {
    #[must_use]
    pub fn new(url: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_email: user_email.into(),
            email_notifications_enabled: true,
            ..Self::default()
        }
    }

    /// Materialize the record with first-run defaults under the given id.
    #[must_use]
    pub fn into_monitor(self, id: String) -> Monitor {
        Monitor {
            id,
            url: self.url,
            user_email: self.user_email,
            is_first_run: true,
            deep_crawl: self.deep_crawl,
            deep_crawl_depth: self.deep_crawl_depth.unwrap_or(1).max(1),
            requires_login: self.requires_login,
            username: self.username,
            password: self.password,
            captcha_json: self.captcha_json,
            auto_cookies: Vec::new(),
            last_scraped_text: String::new(),
            latest_ai_summary: Some(PENDING_SUMMARY.to_string()),
            ai_focus_note: self.ai_focus_note,
            email_notifications_enabled: self.email_notifications_enabled,
            telegram_notifications_enabled: self.telegram_notifications_enabled,
            telegram_chat_id: self.telegram_chat_id,
            last_updated_timestamp: None,
        }
    }
}
