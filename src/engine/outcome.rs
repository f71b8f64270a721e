//! Terminal outcomes of monitor processing.

/// Where one monitor ended up after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// First run: text and summary stored, baseline notification sent.
    BaselineSaved,
    /// Text identical to the stored text; timestamp refreshed.
    Unchanged,
    /// Text changed but the summarizer judged it trivial; timestamp refreshed.
    InsignificantChange,
    /// Text and summary stored, notification sent.
    SignificantChange,
    /// Nothing stored; the run moved on.
    Failed { reason: String },
}

impl MonitorOutcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::BaselineSaved => "baseline_saved",
            Self::Unchanged => "unchanged",
            Self::InsignificantChange => "insignificant_change",
            Self::SignificantChange => "significant_change",
            Self::Failed { .. } => "failed",
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorReport {
    pub monitor_id: String,
    pub outcome: MonitorOutcome,
}

/// Outcomes of every monitor in one run, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    entries: Vec<MonitorReport>,
}

impl RunReport {
    pub fn record(&mut self, monitor_id: String, outcome: MonitorOutcome) {
        self.entries.push(MonitorReport {
            monitor_id,
            outcome,
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[MonitorReport] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn outcome_for(&self, monitor_id: &str) -> Option<&MonitorOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.monitor_id == monitor_id)
            .map(|entry| &entry.outcome)
    }

    /// Number of monitors whose outcome has the given label.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.label() == label)
            .count()
    }

    /// Reports whose outcome is [`MonitorOutcome::Failed`].
    pub fn failures(&self) -> impl Iterator<Item = &MonitorReport> {
        self.entries.iter().filter(|entry| entry.outcome.is_failed())
    }

    /// One-line tally for logs.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} monitor(s): {} baseline, {} unchanged, {} insignificant, {} significant, {} failed",
            self.len(),
            self.count("baseline_saved"),
            self.count("unchanged"),
            self.count("insignificant_change"),
            self.count("significant_change"),
            self.failures().count(),
        )
    }
}
