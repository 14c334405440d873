//! Numeric measurements attached to findings or to a whole run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named numeric measurement with optional bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric type (e.g. `MCC`).
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Measured value.
    pub value: f64,
    /// Lower bound, if the producing rule defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound or threshold, if the producing rule defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Metric {
    /// Creates an unbounded metric.
    #[must_use]
    pub fn new(metric_type: impl Into<String>, value: f64) -> Self {
        Self {
            metric_type: metric_type.into(),
            value,
            min: None,
            max: None,
        }
    }

    /// Sets the lower bound.
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the upper bound.
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.metric_type, self.value)?;
        if let Some(max) = self.max {
            write!(f, " (max {max})")?;
        }
        Ok(())
    }
}

/// A metric scoped to the whole run rather than to one finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetric {
    /// Metric type (e.g. `number of packages`).
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Measured value.
    pub value: f64,
}

impl ProjectMetric {
    /// Creates a project metric.
    #[must_use]
    pub fn new(metric_type: impl Into<String>, value: f64) -> Self {
        Self {
            metric_type: metric_type.into(),
            value,
        }
    }

    /// Creates a project metric from a count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_count(metric_type: impl Into<String>, count: usize) -> Self {
        Self::new(metric_type, count as f64)
    }
}

impl fmt::Display for ProjectMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.metric_type, self.value)
    }
}

/// Types carrying a list of metrics.
pub trait HasMetrics {
    /// All metrics, in the order they were attached.
    fn metrics(&self) -> &[Metric];

    /// First metric of the given type.
    ///
    /// Several metrics may share a type; only the first is returned.
    fn metric_by_type(&self, metric_type: &str) -> Option<&Metric> {
        self.metrics().iter().find(|m| m.metric_type == metric_type)
    }
}
