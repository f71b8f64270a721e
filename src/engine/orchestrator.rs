//! Bounded-concurrency run orchestration
//!
//! One task per monitor, all spawned up front; each task waits for a permit
//! from a counting semaphore before it opens its browsing context, so at most
//! `pool_size` monitors (and contexts) are active at any moment. Permits are
//! released when the task ends, whatever the outcome.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{error, info};
use thiserror::Error;
use tokio::sync::Semaphore;

use super::outcome::{MonitorOutcome, RunReport};
use super::pipeline::MonitorPipeline;
use crate::browser::ContextFactory;
use crate::change_detector::ChangeDetector;
use crate::config::EngineConfig;
use crate::crawl_engine::PageCrawler;
use crate::notifier::Notifier;
use crate::session::SessionManager;
use crate::store::{MonitorStore, StoreError};
use crate::summarizer::{SummarizationGateway, Summarizer};

/// Run-fatal failures. Everything else is contained to a single monitor.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load monitors: {0}")]
    LoadMonitors(#[from] StoreError),
}

pub struct WatchEngine {
    pool_size: usize,
    contexts: Arc<dyn ContextFactory>,
    pipeline: Arc<MonitorPipeline>,
}

impl WatchEngine {
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn MonitorStore>,
        contexts: Arc<dyn ContextFactory>,
        summarizer: Arc<dyn Summarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let pipeline = MonitorPipeline {
            sessions: SessionManager::new(Arc::clone(&store)),
            crawler: PageCrawler::new(config.max_pages_per_monitor()),
            detector: ChangeDetector::new(config.diff_char_limit()),
            gateway: SummarizationGateway::new(
                summarizer,
                config.summarizer_backoff(),
                config.summarizer_timeout(),
            ),
            store,
            notifier,
        };

        Self {
            pool_size: config.pool_size().max(1),
            contexts,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Process every monitor in the store once.
    pub async fn run(&self) -> Result<RunReport, EngineError> {
        let monitors = self.pipeline.store.load_monitors().await?;
        info!(
            target: "webwatcher::engine",
            "Found {} monitor(s) to process with a pool of {}",
            monitors.len(),
            self.pool_size
        );

        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut active_tasks = FuturesUnordered::new();

        for monitor in monitors {
            let semaphore = Arc::clone(&semaphore);
            let contexts = Arc::clone(&self.contexts);
            let pipeline = Arc::clone(&self.pipeline);
            let monitor_id = monitor.id.clone();

            let task = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return MonitorOutcome::Failed {
                        reason: "worker pool closed".to_string(),
                    };
                };
                pipeline.run_monitor(contexts.as_ref(), &monitor).await
            });

            active_tasks.push(async move { (monitor_id, task.await) });
        }

        let mut report = RunReport::default();
        while let Some((monitor_id, joined)) = active_tasks.next().await {
            let outcome = joined.unwrap_or_else(|e| {
                error!(target: "webwatcher::engine", "Task for monitor {monitor_id} panicked: {e}");
                MonitorOutcome::Failed {
                    reason: format!("task panicked: {e}"),
                }
            });
            report.record(monitor_id, outcome);
        }

        info!(target: "webwatcher::engine", "Run complete: {}", report.summary_line());
        Ok(report)
    }
}
