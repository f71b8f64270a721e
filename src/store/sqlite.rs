//! SQLite-backed monitor store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};

use super::{MonitorStore, MonitorUpdate, StoreError};
use crate::monitor::{Monitor, NewMonitor, SessionCookie};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS monitors (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    user_email TEXT NOT NULL,
    is_first_run INTEGER NOT NULL DEFAULT 1,
    deep_crawl INTEGER NOT NULL DEFAULT 0,
    deep_crawl_depth INTEGER NOT NULL DEFAULT 1,
    requires_login INTEGER NOT NULL DEFAULT 0,
    username TEXT,
    password TEXT,
    captcha_json TEXT,
    -- JSON array of captured cookies, NULL until a login captured some
    auto_cookies TEXT,
    last_scraped_text TEXT NOT NULL DEFAULT '',
    latest_ai_summary TEXT,
    ai_focus_note TEXT,
    email_notifications_enabled INTEGER NOT NULL DEFAULT 1,
    telegram_notifications_enabled INTEGER NOT NULL DEFAULT 0,
    telegram_chat_id TEXT,
    -- Unix seconds
    last_updated_timestamp INTEGER,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_monitors_user ON monitors(user_email);
"#;

#[derive(Clone)]
pub struct SqliteMonitorStore {
    pool: SqlitePool,
}

impl SqliteMonitorStore {
    /// Open (creating if missing) the database at `url`, e.g.
    /// `sqlite://monitors.db`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database. A single never-expiring connection keeps
    /// the data alive for the store's lifetime.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Register a monitor with first-run defaults and return the stored record.
    pub async fn insert_monitor(&self, new: NewMonitor) -> Result<Monitor, StoreError> {
        let monitor = new.into_monitor(uuid::Uuid::new_v4().to_string());

        sqlx::query(
            r#"
            INSERT INTO monitors (
                id, url, user_email, is_first_run, deep_crawl, deep_crawl_depth,
                requires_login, username, password, captcha_json, last_scraped_text,
                latest_ai_summary, ai_focus_note, email_notifications_enabled,
                telegram_notifications_enabled, telegram_chat_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&monitor.id)
        .bind(&monitor.url)
        .bind(&monitor.user_email)
        .bind(monitor.is_first_run)
        .bind(monitor.deep_crawl)
        .bind(i64::from(monitor.deep_crawl_depth))
        .bind(monitor.requires_login)
        .bind(&monitor.username)
        .bind(&monitor.password)
        .bind(&monitor.captcha_json)
        .bind(&monitor.last_scraped_text)
        .bind(&monitor.latest_ai_summary)
        .bind(&monitor.ai_focus_note)
        .bind(monitor.email_notifications_enabled)
        .bind(monitor.telegram_notifications_enabled)
        .bind(&monitor.telegram_chat_id)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        debug!(target: "webwatcher::store", "Inserted monitor {} for {}", monitor.id, monitor.url);
        Ok(monitor)
    }

    /// Fetch one monitor by id.
    pub async fn get_monitor(&self, id: &str) -> Result<Monitor, StoreError> {
        let row = sqlx::query("SELECT * FROM monitors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        monitor_from_row(&row)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MonitorStore for SqliteMonitorStore {
    async fn load_monitors(&self) -> Result<Vec<Monitor>, StoreError> {
        let rows = sqlx::query("SELECT * FROM monitors ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(monitor_from_row).collect()
    }

    async fn apply_update(&self, id: &str, update: &MonitorUpdate) -> Result<(), StoreError> {
        let query = match update {
            MonitorUpdate::Checked { at } => {
                sqlx::query("UPDATE monitors SET last_updated_timestamp = ? WHERE id = ?")
                    .bind(at.timestamp())
            }
            MonitorUpdate::Baseline { text, summary, at }
            | MonitorUpdate::Changed { text, summary, at } => sqlx::query(
                r#"
                UPDATE monitors
                SET last_scraped_text = ?, latest_ai_summary = ?, is_first_run = 0,
                    last_updated_timestamp = ?
                WHERE id = ?
                "#,
            )
            .bind(text.clone())
            .bind(summary.clone())
            .bind(at.timestamp()),
            MonitorUpdate::SessionCookies(cookies) => {
                sqlx::query("UPDATE monitors SET auto_cookies = ? WHERE id = ?")
                    .bind(serde_json::to_string(cookies)?)
            }
        };

        let result = query.bind(id.to_string()).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn monitor_from_row(row: &SqliteRow) -> Result<Monitor, StoreError> {
    let id: String = row.try_get("id")?;

    let auto_cookies = match row.try_get::<Option<String>, _>("auto_cookies")? {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str::<Vec<SessionCookie>>(&raw).unwrap_or_else(|e| {
                warn!(
                    target: "webwatcher::store",
                    "Discarding unreadable captured cookies for monitor {id}: {e}"
                );
                Vec::new()
            })
        }
        _ => Vec::new(),
    };

    let depth: i64 = row.try_get("deep_crawl_depth")?;
    let last_updated_timestamp = row
        .try_get::<Option<i64>, _>("last_updated_timestamp")?
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    Ok(Monitor {
        url: row.try_get("url")?,
        user_email: row.try_get("user_email")?,
        is_first_run: row.try_get("is_first_run")?,
        deep_crawl: row.try_get("deep_crawl")?,
        deep_crawl_depth: u32::try_from(depth).unwrap_or(1).max(1),
        requires_login: row.try_get("requires_login")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        captcha_json: row.try_get("captcha_json")?,
        auto_cookies,
        last_scraped_text: row.try_get("last_scraped_text")?,
        latest_ai_summary: row.try_get("latest_ai_summary")?,
        ai_focus_note: row.try_get("ai_focus_note")?,
        email_notifications_enabled: row.try_get("email_notifications_enabled")?,
        telegram_notifications_enabled: row.try_get("telegram_notifications_enabled")?,
        telegram_chat_id: row.try_get("telegram_chat_id")?,
        last_updated_timestamp,
        id,
    })
}
