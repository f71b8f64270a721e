//! Configuration module for the watch engine
//!
//! `EngineConfig` and its builder hold run tunables; `Settings` loads the
//! process environment.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod settings;
pub mod types;

// Re-exports for public API
pub use builder::EngineConfigBuilder;
pub use settings::{ConfigError, Settings};
pub use types::EngineConfig;
