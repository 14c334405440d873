//! Findings: one reported occurrence of a rule condition.

use crate::attributes::{AttributeRegistry, AttributeValue, Attributes};
use crate::entity::Entity;
use crate::issue::{Issue, Severity};
use crate::location::{Location, SourceLocation, TextRange};
use crate::metric::{HasMetrics, Metric};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Types with a deterministic single-line textual form.
///
/// The compact string is the key used to match findings across runs
/// (suppression, baselines), so it must stay byte-stable for unchanged input.
pub trait Compactable {
    /// Single-line form combining rule id and position.
    fn compact(&self) -> String;

    /// Compact form refined with the entity signature.
    fn compact_with_signature(&self) -> String {
        self.compact()
    }
}

/// Shape of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    /// Plain occurrence.
    CodeSmell,
    /// A measured value reached a configured threshold.
    Thresholded {
        /// Measured value.
        value: f64,
        /// Threshold that was reached.
        threshold: f64,
    },
}

/// One detected occurrence of an [`Issue`].
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    id: String,
    issue: Arc<Issue>,
    entity: Entity,
    message: String,
    references: Vec<Entity>,
    metrics: Vec<Metric>,
    #[serde(flatten)]
    kind: FindingKind,
}

fn entity_list(entities: &[Entity]) -> AttributeValue {
    AttributeValue::List(
        entities
            .iter()
            .map(|e| AttributeValue::text(e.compact()))
            .collect(),
    )
}

static FINDING_ATTRIBUTES: AttributeRegistry<Finding> = AttributeRegistry::new(&[
    ("id", |f: &Finding| AttributeValue::text(&f.id)),
    ("message", |f: &Finding| AttributeValue::text(&f.message)),
    ("compact", |f: &Finding| AttributeValue::text(f.compact())),
    ("references", |f: &Finding| entity_list(&f.references)),
    ("metrics", |f: &Finding| {
        AttributeValue::List(
            f.metrics
                .iter()
                .map(|m| AttributeValue::text(m.to_string()))
                .collect(),
        )
    }),
]);

impl Finding {
    /// Starts building a code smell finding for `entity`.
    #[must_use]
    pub fn builder(issue: &Arc<Issue>, entity: Entity) -> FindingBuilder {
        FindingBuilder {
            id: None,
            issue: Arc::clone(issue),
            entity,
            message: None,
            references: Vec::new(),
            metrics: Vec::new(),
        }
    }

    /// Creates a code smell finding with a message.
    #[must_use]
    pub fn new(issue: &Arc<Issue>, entity: Entity, message: impl Into<String>) -> Self {
        Self::builder(issue, entity).message(message).build()
    }

    /// Creates a finding for a metric that reached its threshold.
    ///
    /// The threshold is the metric's `max`, or its value when unbounded.
    #[must_use]
    pub fn thresholded(
        issue: &Arc<Issue>,
        entity: Entity,
        metric: Metric,
        message: impl Into<String>,
    ) -> Self {
        let kind = FindingKind::Thresholded {
            value: metric.value,
            threshold: metric.max.unwrap_or(metric.value),
        };
        let mut finding = Self::builder(issue, entity)
            .message(message)
            .metric(metric)
            .build();
        finding.kind = kind;
        finding
    }

    /// Finding id, the issue id unless overridden.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The issue this finding is an occurrence of.
    #[must_use]
    pub fn issue(&self) -> &Arc<Issue> {
        &self.issue
    }

    /// Returns true if this finding was produced with exactly this issue instance.
    #[must_use]
    pub fn is_from(&self, issue: &Arc<Issue>) -> bool {
        Arc::ptr_eq(&self.issue, issue)
    }

    /// Severity of the issue.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.issue.severity
    }

    /// Flagged entity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Occurrence-specific message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Related entities, never including [`Finding::entity`].
    #[must_use]
    pub fn references(&self) -> &[Entity] {
        &self.references
    }

    /// Shape of this finding.
    #[must_use]
    pub fn kind(&self) -> FindingKind {
        self.kind
    }

    /// Location of the flagged entity.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.entity.location
    }

    /// File of the flagged entity.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.entity.location.file
    }

    /// Start position of the flagged entity.
    #[must_use]
    pub fn start_position(&self) -> SourceLocation {
        self.entity.location.start
    }

    /// Byte range of the flagged entity.
    #[must_use]
    pub fn text_range(&self) -> TextRange {
        self.entity.location.text
    }

    /// Signature of the flagged entity.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.entity.signature
    }

    /// Name of the flagged entity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.entity.name
    }

    /// Enclosing class of the flagged entity.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.entity.class_name
    }
}

impl Compactable for Finding {
    fn compact(&self) -> String {
        match self.kind {
            FindingKind::CodeSmell => format!("{} - {}", self.id, self.entity.compact()),
            FindingKind::Thresholded { value, threshold } => format!(
                "{} - {value}/{threshold} - {}",
                self.id,
                self.entity.compact()
            ),
        }
    }

    fn compact_with_signature(&self) -> String {
        format!("{} - Signature={}", self.compact(), self.entity.signature)
    }
}

impl HasMetrics for Finding {
    fn metrics(&self) -> &[Metric] {
        &self.metrics
    }
}

impl Attributes for Finding {
    fn find_attribute(&self, name: &str) -> Option<AttributeValue> {
        if let Some(value) = FINDING_ATTRIBUTES.get(self, name) {
            return Some(value);
        }
        if let FindingKind::Thresholded { value, threshold } = self.kind {
            match name {
                "value" => return Some(AttributeValue::Number(value)),
                "threshold" => return Some(AttributeValue::Number(threshold)),
                _ => {}
            }
        }
        self.entity
            .find_attribute(name)
            .or_else(|| self.issue.find_attribute(name))
    }
}

/// Builder for [`Finding`].
#[derive(Debug)]
pub struct FindingBuilder {
    id: Option<String>,
    issue: Arc<Issue>,
    entity: Entity,
    message: Option<String>,
    references: Vec<Entity>,
    metrics: Vec<Metric>,
}

impl FindingBuilder {
    /// Overrides the finding id (defaults to the issue id).
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the message (defaults to the issue description).
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a related entity.
    #[must_use]
    pub fn reference(mut self, entity: Entity) -> Self {
        self.references.push(entity);
        self
    }

    /// Adds several related entities.
    #[must_use]
    pub fn references(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.references.extend(entities);
        self
    }

    /// Attaches a metric.
    #[must_use]
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Builds the finding. References equal to the flagged entity are dropped.
    #[must_use]
    pub fn build(self) -> Finding {
        let Self {
            id,
            issue,
            entity,
            message,
            mut references,
            metrics,
        } = self;
        references.retain(|r| *r != entity);
        Finding {
            id: id.unwrap_or_else(|| issue.id.clone()),
            message: message.unwrap_or_else(|| issue.description.clone()),
            issue,
            entity,
            references,
            metrics,
            kind: FindingKind::CodeSmell,
        }
    }
}
