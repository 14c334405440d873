//! Rule identity and metadata shared by every finding a rule produces.

use crate::attributes::{AttributeRegistry, AttributeValue, Attributes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default classification of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Generic code smell.
    CodeSmell,
    /// Formatting or naming convention.
    Style,
    /// Likely a mistake.
    Warning,
    /// Most likely a bug.
    Defect,
    /// Low impact.
    Minor,
    /// Hurts long term maintainability.
    Maintainability,
    /// Security relevant.
    Security,
    /// Performance relevant.
    Performance,
}

impl Severity {
    /// All severities, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::CodeSmell,
        Self::Style,
        Self::Warning,
        Self::Defect,
        Self::Minor,
        Self::Maintainability,
        Self::Security,
        Self::Performance,
    ];

    /// Lowercase name as used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CodeSmell => "codesmell",
            Self::Style => "style",
            Self::Warning => "warning",
            Self::Defect => "defect",
            Self::Minor => "minor",
            Self::Maintainability => "maintainability",
            Self::Security => "security",
            Self::Performance => "performance",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated effort to fix one occurrence of an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Debt {
    /// Days.
    pub days: u32,
    /// Hours.
    pub hours: u32,
    /// Minutes.
    pub mins: u32,
}

impl Debt {
    /// Five minutes.
    pub const FIVE_MINS: Self = Self::new(0, 0, 5);
    /// Ten minutes.
    pub const TEN_MINS: Self = Self::new(0, 0, 10);
    /// Twenty minutes.
    pub const TWENTY_MINS: Self = Self::new(0, 0, 20);

    /// Creates a debt value.
    #[must_use]
    pub const fn new(days: u32, hours: u32, mins: u32) -> Self {
        Self { days, hours, mins }
    }

    /// Total debt in minutes.
    #[must_use]
    pub fn total_mins(self) -> u64 {
        u64::from(self.days) * 24 * 60 + u64::from(self.hours) * 60 + u64::from(self.mins)
    }
}

impl fmt::Display for Debt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.days > 0 {
            parts.push(format!("{}d", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{}h", self.hours));
        }
        if self.mins > 0 || parts.is_empty() {
            parts.push(format!("{}min", self.mins));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Identity and metadata of a rule.
///
/// A rule creates its `Issue` once and shares it (through an `Arc`) with
/// every finding it reports, so "which rule produced this" is answered by
/// pointer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Rule id (e.g. `UnnecessaryParentheses`).
    pub id: String,
    /// Default severity.
    pub severity: Severity,
    /// What the rule detects.
    pub description: String,
    /// Estimated effort per occurrence.
    pub debt: Debt,
}

static ISSUE_ATTRIBUTES: AttributeRegistry<Issue> = AttributeRegistry::new(&[
    ("id", |i: &Issue| AttributeValue::text(&i.id)),
    ("severity", |i: &Issue| AttributeValue::text(i.severity.as_str())),
    ("description", |i: &Issue| AttributeValue::text(&i.description)),
    ("debt", |i: &Issue| AttributeValue::text(i.debt.to_string())),
]);

impl Issue {
    /// Creates an issue.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        debt: Debt,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            description: description.into(),
            debt,
        }
    }

    /// Replaces the severity, e.g. with a configured override.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Attributes for Issue {
    fn find_attribute(&self, name: &str) -> Option<AttributeValue> {
        ISSUE_ATTRIBUTES.get(self, name)
    }
}
