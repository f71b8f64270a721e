//! Process settings loaded from the environment
//!
//! `Settings::from_env` reads the variables listed below once at start-up.
//! Values are trimmed and blank values count as unset.
//!
//! | Variable               | Required | Default                   |
//! |------------------------|----------|---------------------------|
//! | `DATABASE_URL`         | yes      |                           |
//! | `GEMINI_API_KEY`       | yes      |                           |
//! | `GEMINI_MODEL`         | no       | `gemini-1.5-flash`        |
//! | `GEMINI_BASE_URL`      | no       | Google's public endpoint  |
//! | `NETLIFY_URL`          | no       | `http://localhost:8888`   |
//! | `WEBHOOK_SECRET`       | no       |                           |
//! | `WATCH_POOL_SIZE`      | no       | 5                         |
//! | `WATCH_HEADLESS`       | no       | `true`                    |
//! | `WATCH_INTERVAL_SECS`  | no       | single run                |
//!
//! `CHROMIUM_PATH` is read directly by browser discovery.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use super::types::EngineConfig;
use crate::utils::redact;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_NOTIFY_BASE_URL: &str = "http://localhost:8888";

/// Errors raised while assembling [`Settings`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("invalid engine configuration: {0}")]
    Engine(String),
}

/// Everything the binary needs to wire up one engine
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub notify_base_url: String,
    pub webhook_secret: Option<String>,
    /// When set, the binary repeats runs on this interval instead of exiting
    /// after one run.
    pub run_interval: Option<Duration>,
    pub engine: EngineConfig,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("gemini_api_key", &redact(Some(&self.gemini_api_key)))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("notify_base_url", &self.notify_base_url)
            .field("webhook_secret", &redact(self.webhook_secret.as_deref()))
            .field("run_interval", &self.run_interval)
            .field("engine", &self.engine)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let gemini_api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let mut engine = EngineConfig::builder();
        if let Some(pool_size) = parse_opt::<usize>(get("WATCH_POOL_SIZE"), "WATCH_POOL_SIZE")? {
            engine = engine.pool_size(pool_size);
        }
        if let Some(headless) = get("WATCH_HEADLESS") {
            engine = engine.headless(parse_bool(&headless, "WATCH_HEADLESS")?);
        }
        let engine = engine
            .build()
            .map_err(|e| ConfigError::Engine(e.to_string()))?;

        let run_interval = parse_opt::<u64>(get("WATCH_INTERVAL_SECS"), "WATCH_INTERVAL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            database_url,
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            notify_base_url: get("NETLIFY_URL")
                .unwrap_or_else(|| DEFAULT_NOTIFY_BASE_URL.to_string()),
            webhook_secret: get("WEBHOOK_SECRET"),
            run_interval,
            engine,
        })
    }
}

fn parse_opt<T>(value: Option<String>, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_bool(raw: &str, name: &'static str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}
