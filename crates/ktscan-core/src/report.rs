//! In-progress detection buffer and the sealed report.

use crate::finding::Finding;
use crate::issue::Severity;
use crate::metric::ProjectMetric;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Something that could not be analyzed.
///
/// These are recorded in the report rather than returned, so a failing
/// file or listener never hides the results of the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    /// The file could not be parsed and was never dispatched.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// Line of the first syntax error.
        line: usize,
        /// Column of the first syntax error.
        column: usize,
        /// Parser message.
        message: String,
    },

    /// A listener returned an error while processing the file.
    #[error("listener '{listener}' failed: {message}")]
    Listener {
        /// Listener id.
        listener: String,
        /// Error message.
        message: String,
    },

    /// A listener panicked while processing the file.
    #[error("listener '{listener}' panicked: {message}")]
    Panicked {
        /// Listener id.
        listener: String,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// The run was cancelled or timed out before the file was processed.
    #[error("analysis cancelled before the file was processed")]
    Cancelled,

    /// A listener failed during whole-run aggregation.
    #[error("aggregation in '{listener}' failed: {message}")]
    Aggregation {
        /// Listener id.
        listener: String,
        /// Error message.
        message: String,
    },
}

/// Errors from mutating a detection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// The detection was already sealed into a report.
    #[error("report is immutable once sealed")]
    Sealed,
}

#[derive(Debug, Default)]
struct DetectionState {
    sealed: bool,
    findings: BTreeMap<String, Vec<Finding>>,
    project_metrics: Vec<ProjectMetric>,
    errors: BTreeMap<PathBuf, Vec<AnalysisError>>,
    run_errors: Vec<AnalysisError>,
    files_analyzed: usize,
}

impl DetectionState {
    fn check_open(&self) -> Result<(), ReportError> {
        if self.sealed {
            Err(ReportError::Sealed)
        } else {
            Ok(())
        }
    }
}

/// The report while a run is in progress.
///
/// Shared by all file tasks; every mutation takes the one lock, so
/// concurrent appends from different worker threads are safe.
#[derive(Debug, Default)]
pub struct Detection {
    state: Mutex<DetectionState>,
}

impl Detection {
    /// Creates an empty detection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finding under its issue id.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] after [`Detection::seal`].
    pub fn add_finding(&self, finding: Finding) -> Result<(), ReportError> {
        let mut state = self.state.lock();
        state.check_open()?;
        state
            .findings
            .entry(finding.issue().id.clone())
            .or_default()
            .push(finding);
        Ok(())
    }

    /// Appends a project metric.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] after [`Detection::seal`].
    pub fn add_project_metric(&self, metric: ProjectMetric) -> Result<(), ReportError> {
        let mut state = self.state.lock();
        state.check_open()?;
        state.project_metrics.push(metric);
        Ok(())
    }

    /// Records an error against a file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] after [`Detection::seal`].
    pub fn add_file_error(
        &self,
        path: impl Into<PathBuf>,
        error: AnalysisError,
    ) -> Result<(), ReportError> {
        let mut state = self.state.lock();
        state.check_open()?;
        state.errors.entry(path.into()).or_default().push(error);
        Ok(())
    }

    /// Records an error against the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] after [`Detection::seal`].
    pub fn add_run_error(&self, error: AnalysisError) -> Result<(), ReportError> {
        let mut state = self.state.lock();
        state.check_open()?;
        state.run_errors.push(error);
        Ok(())
    }

    /// Counts a file whose per-file phase completed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] after [`Detection::seal`].
    pub fn mark_analyzed(&self) -> Result<(), ReportError> {
        let mut state = self.state.lock();
        state.check_open()?;
        state.files_analyzed += 1;
        Ok(())
    }

    /// Number of findings reported so far.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.state.lock().findings.values().map(Vec::len).sum()
    }

    /// Snapshot of the findings reported so far for one rule.
    #[must_use]
    pub fn findings_for(&self, rule_id: &str) -> Vec<Finding> {
        self.state
            .lock()
            .findings
            .get(rule_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Freezes the detection into a [`Report`].
    ///
    /// Findings of each rule are stably ordered by file path, so the report
    /// does not depend on how file tasks interleaved.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Sealed`] if called twice.
    pub fn seal(&self) -> Result<Report, ReportError> {
        let mut state = self.state.lock();
        state.check_open()?;
        state.sealed = true;

        let mut findings = std::mem::take(&mut state.findings);
        for list in findings.values_mut() {
            list.sort_by(|a, b| a.file().cmp(b.file()));
        }

        Ok(Report {
            findings,
            project_metrics: std::mem::take(&mut state.project_metrics),
            errors: std::mem::take(&mut state.errors),
            run_errors: std::mem::take(&mut state.run_errors),
            files_analyzed: state.files_analyzed,
        })
    }
}

/// Sealed result of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    findings: BTreeMap<String, Vec<Finding>>,
    project_metrics: Vec<ProjectMetric>,
    errors: BTreeMap<PathBuf, Vec<AnalysisError>>,
    run_errors: Vec<AnalysisError>,
    files_analyzed: usize,
}

impl Report {
    /// Findings grouped by rule id.
    #[must_use]
    pub fn findings_by_rule_id(&self) -> &BTreeMap<String, Vec<Finding>> {
        &self.findings
    }

    /// All findings, in rule id order and then report order within a rule.
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.values().flatten()
    }

    /// Findings of one rule.
    #[must_use]
    pub fn findings_for(&self, rule_id: &str) -> &[Finding] {
        self.findings.get(rule_id).map_or(&[], Vec::as_slice)
    }

    /// Total number of findings.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.findings.values().map(Vec::len).sum()
    }

    /// Project metrics in the order they were added.
    #[must_use]
    pub fn project_metrics(&self) -> &[ProjectMetric] {
        &self.project_metrics
    }

    /// First project metric of the given type.
    #[must_use]
    pub fn project_metric(&self, metric_type: &str) -> Option<&ProjectMetric> {
        self.project_metrics
            .iter()
            .find(|m| m.metric_type == metric_type)
    }

    /// Per-file errors (parse failures, listener faults, cancellations).
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<PathBuf, Vec<AnalysisError>> {
        &self.errors
    }

    /// Errors recorded against one file.
    #[must_use]
    pub fn errors_for(&self, path: &Path) -> &[AnalysisError] {
        self.errors.get(path).map_or(&[], Vec::as_slice)
    }

    /// Errors recorded against the whole run.
    #[must_use]
    pub fn run_errors(&self) -> &[AnalysisError] {
        &self.run_errors
    }

    /// Returns true if anything failed to be analyzed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.run_errors.is_empty()
    }

    /// Number of files whose per-file phase completed.
    #[must_use]
    pub fn files_analyzed(&self) -> usize {
        self.files_analyzed
    }

    /// Counts findings by issue severity.
    #[must_use]
    pub fn count_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.all_findings() {
            *counts.entry(finding.severity()).or_insert(0) += 1;
        }
        counts
    }

    /// Returns a copy keeping only the findings accepted by `keep`.
    #[must_use]
    pub fn filter_findings(&self, mut keep: impl FnMut(&Finding) -> bool) -> Self {
        let findings = self
            .findings
            .iter()
            .filter_map(|(id, list)| {
                let kept: Vec<Finding> = list.iter().filter(|f| keep(f)).cloned().collect();
                (!kept.is_empty()).then(|| (id.clone(), kept))
            })
            .collect();
        Self {
            findings,
            ..self.clone()
        }
    }
}
