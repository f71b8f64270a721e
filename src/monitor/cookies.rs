//! Session cookie payloads
//!
//! Cookies reach a browsing context from one of two sources: a JSON payload
//! the monitor owner pasted in, or the jar captured after an automated login.
//! Both are normalized to [`SessionCookie`] before injection.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::redact;

/// One cookie in browser-export shape.
///
/// Serialized with camelCase keys (`httpOnly`, `sameSite`) so captured jars
/// and exported jars share one format; snake_case keys are accepted on input.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Expiry as Unix seconds. Non-positive values mark session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default, alias = "http_only", skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, alias = "same_site", skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &redact(Some(&self.value)))
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expires", &self.expires)
            .field("http_only", &self.http_only)
            .field("secure", &self.secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}

impl SessionCookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            http_only: None,
            secure: None,
            same_site: None,
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Expiry to hand to the browser, dropping session markers like `-1`.
    #[must_use]
    pub fn persistent_expiry(&self) -> Option<f64> {
        self.expires.filter(|secs| *secs > 0.0)
    }
}

/// Where a run's session cookies come from
#[derive(Debug, Clone, PartialEq)]
pub enum CookiePayload {
    /// Owner-supplied JSON, not yet parsed.
    RawManual(String),
    /// Cookies captured by a previous automated login.
    Captured(Vec<SessionCookie>),
}

impl CookiePayload {
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured(_))
    }

    /// Normalize the payload into cookies ready for injection.
    pub fn into_cookies(self) -> Result<Vec<SessionCookie>, CookieParseError> {
        match self {
            Self::Captured(cookies) => Ok(cookies),
            Self::RawManual(raw) => parse_manual_cookies(&raw),
        }
    }
}

#[derive(Debug, Error)]
pub enum CookieParseError {
    #[error("cookie payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cookie payload contains no cookies")]
    Empty,

    #[error("cookie #{index} has an empty name")]
    UnnamedCookie { index: usize },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManualPayload {
    List(Vec<SessionCookie>),
    StorageState { cookies: Vec<SessionCookie> },
}

/// Parse an owner-supplied cookie payload.
///
/// Accepts a bare JSON array of cookies or a storage-state object of the form
/// `{ "cookies": [...] }`.
pub fn parse_manual_cookies(raw: &str) -> Result<Vec<SessionCookie>, CookieParseError> {
    let cookies = match serde_json::from_str::<ManualPayload>(raw.trim())? {
        ManualPayload::List(cookies) | ManualPayload::StorageState { cookies } => cookies,
    };

    if cookies.is_empty() {
        return Err(CookieParseError::Empty);
    }
    if let Some(index) = cookies.iter().position(|c| c.name.trim().is_empty()) {
        return Err(CookieParseError::UnnamedCookie { index });
    }
    Ok(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exported_cookie_list() {
        let raw = r#"[
            {"name": "sid", "value": "abc", "domain": ".example.com", "path": "/",
             "expires": -1, "httpOnly": true, "secure": true, "sameSite": "Lax"}
        ]"#;
        let cookies = parse_manual_cookies(raw).unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "sid");
        assert_eq!(cookies[0].http_only, Some(true));
        assert_eq!(cookies[0].same_site.as_deref(), Some("Lax"));
        assert_eq!(cookies[0].persistent_expiry(), None);
    }

    #[test]
    fn parses_storage_state_and_snake_case_keys() {
        let raw = r#"{"cookies": [{"name": "a", "value": "1", "http_only": false}], "origins": []}"#;
        let cookies = parse_manual_cookies(raw).unwrap();
        assert_eq!(cookies[0].http_only, Some(false));
    }

    #[test]
    fn rejects_garbage_and_empty_lists() {
        assert!(matches!(parse_manual_cookies("not json"), Err(CookieParseError::Json(_))));
        assert!(matches!(parse_manual_cookies("[]"), Err(CookieParseError::Empty)));
        assert!(matches!(
            parse_manual_cookies(r#"[{"name": " ", "value": "x"}]"#),
            Err(CookieParseError::UnnamedCookie { index: 0 })
        ));
    }

    #[test]
    fn captured_jar_round_trips_through_camel_case() {
        let mut cookie = SessionCookie::new("sid", "abc").with_domain("example.com");
        cookie.http_only = Some(true);
        let json = serde_json::to_string(&vec![cookie.clone()]).unwrap();
        assert!(json.contains("httpOnly"));
        assert_eq!(parse_manual_cookies(&json).unwrap(), vec![cookie]);
    }
}
