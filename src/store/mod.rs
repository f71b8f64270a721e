//! Monitor persistence
//!
//! The engine reads every monitor once at the start of a run and afterwards
//! only issues point updates that overwrite engine-owned fields. Owner-edited
//! configuration is never written from here.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::monitor::{Monitor, SessionCookie};

pub use sqlite::SqliteMonitorStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode cookies: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("monitor {0} not found")]
    NotFound(String),
}

/// Field sets the engine may write for one monitor.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorUpdate {
    /// Visited, nothing worth recording: timestamp only.
    Checked { at: DateTime<Utc> },
    /// First successful run: text, summary, `is_first_run = false`, timestamp.
    Baseline {
        text: String,
        summary: String,
        at: DateTime<Utc>,
    },
    /// Significant change: text, summary, `is_first_run = false`, timestamp.
    Changed {
        text: String,
        summary: String,
        at: DateTime<Utc>,
    },
    /// Cookies captured after a login.
    SessionCookies(Vec<SessionCookie>),
}

#[async_trait]
pub trait MonitorStore: Send + Sync {
    async fn load_monitors(&self) -> Result<Vec<Monitor>, StoreError>;

    async fn apply_update(&self, id: &str, update: &MonitorUpdate) -> Result<(), StoreError>;
}
