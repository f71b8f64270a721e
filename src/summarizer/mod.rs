//! Summarization gateway
//!
//! Turns a diff into a short natural-language summary through a
//! [`Summarizer`] backend. The gateway owns the failure policy: each attempt
//! is time-boxed, a failed attempt is retried exactly once after a fixed
//! backoff, and a second failure yields [`FALLBACK_SUMMARY`]. Callers always
//! get a string back.

pub mod gemini;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::warn;

use crate::change_detector::DiffResult;

pub use gemini::GeminiSummarizer;
pub use prompt::build_prompt;

/// Substring a summarizer returns when a diff is not worth reporting.
pub const NO_SIGNIFICANT_CHANGES: &str = "No significant changes";

/// Summary used when the backend failed twice.
pub const FALLBACK_SUMMARY: &str = "Manual check required due to summarization error.";

const MAX_ATTEMPTS: u32 = 2;

/// Text-completion backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    /// First scan: there is no previous version to compare against.
    Baseline,
    Changes,
}

/// Everything the prompt is built from. Only the diff is sent, never the
/// full page texts.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub kind: SummaryKind,
    pub diff: String,
    pub truncated: bool,
    pub focus_note: Option<String>,
}

impl SummaryRequest {
    #[must_use]
    pub fn baseline(diff: &DiffResult, focus_note: Option<&str>) -> Self {
        Self::new(SummaryKind::Baseline, diff, focus_note)
    }

    #[must_use]
    pub fn changes(diff: &DiffResult, focus_note: Option<&str>) -> Self {
        Self::new(SummaryKind::Changes, diff, focus_note)
    }

    fn new(kind: SummaryKind, diff: &DiffResult, focus_note: Option<&str>) -> Self {
        Self {
            kind,
            diff: diff.text().to_string(),
            truncated: diff.is_truncated(),
            focus_note: focus_note.map(str::to_owned),
        }
    }
}

/// Whether a summary is the "nothing worth reporting" verdict.
///
/// Case-sensitive substring test; the fallback summary is not a verdict and
/// therefore counts as significant.
#[must_use]
pub fn is_insignificant(summary: &str) -> bool {
    summary.contains(NO_SIGNIFICANT_CHANGES)
}

pub struct SummarizationGateway {
    backend: Arc<dyn Summarizer>,
    backoff: Duration,
    attempt_timeout: Duration,
}

impl SummarizationGateway {
    #[must_use]
    pub fn new(backend: Arc<dyn Summarizer>, backoff: Duration, attempt_timeout: Duration) -> Self {
        Self {
            backend,
            backoff,
            attempt_timeout,
        }
    }

    pub async fn summarize(&self, request: &SummaryRequest) -> String {
        let prompt = build_prompt(request);

        for attempt in 1..=MAX_ATTEMPTS {
            match tokio::time::timeout(self.attempt_timeout, self.backend.summarize(&prompt)).await {
                Ok(Ok(summary)) if !summary.trim().is_empty() => return summary.trim().to_string(),
                Ok(Ok(_)) => warn!(
                    target: "webwatcher::summarizer",
                    "Summarizer returned an empty summary (attempt {attempt}/{MAX_ATTEMPTS})"
                ),
                Ok(Err(e)) => warn!(
                    target: "webwatcher::summarizer",
                    "Summarization failed (attempt {attempt}/{MAX_ATTEMPTS}): {e:#}"
                ),
                Err(_) => warn!(
                    target: "webwatcher::summarizer",
                    "Summarization timed out after {:?} (attempt {attempt}/{MAX_ATTEMPTS})",
                    self.attempt_timeout
                ),
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(self.backoff).await;
            }
        }

        FALLBACK_SUMMARY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_test_is_case_sensitive_substring() {
        assert!(is_insignificant("No significant changes"));
        assert!(is_insignificant("Verdict: No significant changes detected."));
        assert!(!is_insignificant("no significant changes"));
        assert!(!is_insignificant(FALLBACK_SUMMARY));
    }
}
