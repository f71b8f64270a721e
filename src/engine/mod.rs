//! Run orchestration: the worker pool, the per-monitor state machine, the
//! run report and periodic scheduling.

pub mod orchestrator;
pub mod outcome;
mod pipeline;
pub mod schedule;

pub use orchestrator::{EngineError, WatchEngine};
pub use outcome::{MonitorOutcome, MonitorReport, RunReport};
pub use schedule::run_periodically;
