//! Baselines of accepted findings.
//!
//! A baseline records findings that were present when it was written, so
//! later runs only surface new ones. Findings are matched by issue id and
//! entity signature, which survives unrelated edits that shift line numbers.

use crate::finding::Finding;
use crate::report::Report;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing a baseline.
#[derive(Debug, Error)]
pub enum BaselineError {
    /// Failed to read or write the baseline file.
    #[error("failed to access baseline {path}: {source}")]
    Io {
        /// Baseline path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The baseline is not valid TOML.
    #[error("failed to parse baseline: {0}")]
    Parse(#[from] toml::de::Error),

    /// The baseline could not be serialized.
    #[error("failed to serialize baseline: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Set of accepted findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    #[serde(default)]
    findings: BTreeSet<String>,
}

impl Baseline {
    /// Creates an empty baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts every finding of a report.
    #[must_use]
    pub fn from_report(report: &Report) -> Self {
        Self {
            findings: report.all_findings().map(baseline_key).collect(),
        }
    }

    /// Parses a baseline from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, BaselineError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a baseline file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, BaselineError> {
        let content = std::fs::read_to_string(path).map_err(|source| BaselineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Serializes the baseline to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, BaselineError> {
        Ok(toml::to_string(self)?)
    }

    /// Writes the baseline to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), BaselineError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| BaselineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of accepted findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Returns true if nothing is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns true if the finding was accepted.
    #[must_use]
    pub fn contains(&self, finding: &Finding) -> bool {
        self.findings.contains(&baseline_key(finding))
    }

    /// Returns a copy of the report without accepted findings.
    #[must_use]
    pub fn filter(&self, report: &Report) -> Report {
        report.filter_findings(|f| !self.contains(f))
    }
}

fn baseline_key(finding: &Finding) -> String {
    format!("{}:{}", finding.id(), finding.signature())
}
