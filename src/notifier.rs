//! Change notifications
//!
//! A confirmed change (or a fresh baseline) is posted as JSON to the
//! notification webhook, which fans it out to email and Telegram according to
//! the owner's preferences. Delivery is best effort: callers log errors and
//! move on, and nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::monitor::Monitor;
use crate::utils::NOTIFY_TIMEOUT_SECS;

/// Path of the notify function under the webhook base URL.
pub const NOTIFY_PATH: &str = "/.netlify/functions/notify";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification webhook answered with status {0}")]
    Status(reqwest::StatusCode),
}

/// Monitor fields the webhook needs to route a notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifiedMonitor {
    pub url: String,
    pub user_email: String,
    pub email_notifications_enabled: bool,
    pub telegram_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub monitor: NotifiedMonitor,
    pub summary: String,
}

impl NotificationPayload {
    #[must_use]
    pub fn new(monitor: &Monitor, summary: &str) -> Self {
        Self {
            monitor: NotifiedMonitor {
                url: monitor.url.clone(),
                user_email: monitor.user_email.clone(),
                email_notifications_enabled: monitor.email_notifications_enabled,
                telegram_notifications_enabled: monitor.telegram_notifications_enabled,
                telegram_chat_id: monitor.telegram_chat_id.clone(),
            },
            summary: summary.to_string(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(base_url: &str, secret: Option<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(NOTIFY_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{NOTIFY_PATH}", base_url.trim_end_matches('/')),
            secret: secret.filter(|s| !s.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request.send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(NotifyError::Status(response.status()));
        }
        Ok(())
    }
}
