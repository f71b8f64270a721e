//! Per-monitor processing
//!
//! Session → crawl → diff → (summarize) → persist → (notify), strictly in that
//! order on one browsing context. Final-state persistence is the only write
//! whose failure fails the monitor, and it happens before any notification.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use log::{error, info, warn};
use thiserror::Error;

use super::outcome::MonitorOutcome;
use crate::browser::{BrowsingContext, ContextFactory};
use crate::change_detector::ChangeDetector;
use crate::crawl_engine::{CrawlError, PageCrawler};
use crate::monitor::Monitor;
use crate::notifier::{NotificationPayload, Notifier};
use crate::session::SessionManager;
use crate::store::{MonitorStore, MonitorUpdate, StoreError};
use crate::summarizer::{SummarizationGateway, SummaryRequest, is_insignificant};

#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error("failed to persist monitor state: {0}")]
    Persist(#[from] StoreError),

    #[error("monitor processing panicked: {0}")]
    Panicked(String),
}

pub(crate) struct MonitorPipeline {
    pub(crate) store: Arc<dyn MonitorStore>,
    pub(crate) sessions: SessionManager,
    pub(crate) crawler: PageCrawler,
    pub(crate) detector: ChangeDetector,
    pub(crate) gateway: SummarizationGateway,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl MonitorPipeline {
    /// Process one monitor on a fresh context. The context is closed on every
    /// path, a panic inside processing included.
    pub(crate) async fn run_monitor(
        &self,
        contexts: &dyn ContextFactory,
        monitor: &Monitor,
    ) -> MonitorOutcome {
        let context = match contexts.open().await {
            Ok(context) => context,
            Err(e) => {
                error!(
                    target: "webwatcher::engine",
                    "Could not open a browsing context for monitor {}: {e:#}",
                    monitor.id
                );
                return MonitorOutcome::Failed {
                    reason: format!("browsing context unavailable: {e:#}"),
                };
            }
        };

        let result = AssertUnwindSafe(self.process(context.as_ref(), monitor))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(PipelineError::Panicked(panic_message(panic.as_ref())))
            });
        context.close().await;

        match result {
            Ok(outcome) => {
                info!(
                    target: "webwatcher::engine",
                    "Monitor {} ({}) finished: {}",
                    monitor.id,
                    monitor.url,
                    outcome.label()
                );
                outcome
            }
            Err(e) => {
                error!(
                    target: "webwatcher::engine",
                    "Monitor {} ({}) failed: {e}",
                    monitor.id,
                    monitor.url
                );
                MonitorOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn process(
        &self,
        context: &dyn BrowsingContext,
        monitor: &Monitor,
    ) -> Result<MonitorOutcome, PipelineError> {
        let session = self.sessions.prepare(context, monitor).await;
        let document = self
            .crawler
            .crawl(context, monitor, session.start_page_loaded)
            .await?;
        let new_text = document.render();
        let focus = monitor.focus_note();

        if monitor.is_first_run {
            let diff = self.detector.detect("", &new_text);
            let summary = self
                .gateway
                .summarize(&SummaryRequest::baseline(&diff, focus))
                .await;
            self.store
                .apply_update(
                    &monitor.id,
                    &MonitorUpdate::Baseline {
                        text: new_text,
                        summary: summary.clone(),
                        at: Utc::now(),
                    },
                )
                .await?;
            self.dispatch(monitor, &summary).await;
            return Ok(MonitorOutcome::BaselineSaved);
        }

        let diff = self.detector.detect(&monitor.last_scraped_text, &new_text);
        if diff.is_empty() {
            self.touch(monitor).await?;
            return Ok(MonitorOutcome::Unchanged);
        }

        let summary = self
            .gateway
            .summarize(&SummaryRequest::changes(&diff, focus))
            .await;
        if is_insignificant(&summary) {
            self.touch(monitor).await?;
            return Ok(MonitorOutcome::InsignificantChange);
        }

        self.store
            .apply_update(
                &monitor.id,
                &MonitorUpdate::Changed {
                    text: new_text,
                    summary: summary.clone(),
                    at: Utc::now(),
                },
            )
            .await?;
        self.dispatch(monitor, &summary).await;
        Ok(MonitorOutcome::SignificantChange)
    }

    async fn touch(&self, monitor: &Monitor) -> Result<(), StoreError> {
        self.store
            .apply_update(&monitor.id, &MonitorUpdate::Checked { at: Utc::now() })
            .await
    }

    async fn dispatch(&self, monitor: &Monitor, summary: &str) {
        let payload = NotificationPayload::new(monitor, summary);
        match self.notifier.notify(&payload).await {
            Ok(()) => info!(
                target: "webwatcher::notify",
                "Notification sent for monitor {}",
                monitor.id
            ),
            Err(e) => warn!(
                target: "webwatcher::notify",
                "Notification for monitor {} failed: {e}",
                monitor.id
            ),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
