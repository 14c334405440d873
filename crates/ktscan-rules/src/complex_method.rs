//! Rule to limit the cyclomatic complexity of functions.
//!
//! # Configuration
//!
//! - `threshold`: complexity at which a function is reported (default: 10)

use ktscan_core::{Debt, Finding, Issue, ListenerError, Metric, Rule, Severity, SourceFile};
use ktscan_kotlin::entity_of;
use ktscan_kotlin::syntax::{descendants, FUNCTION_KIND};
use std::sync::Arc;
use tracing::debug;
use tree_sitter::Node;

/// Rule id for complex-method.
pub const ID: &str = "ComplexMethod";

/// Metric type attached to findings.
pub const METRIC: &str = "MCC";

/// Default complexity threshold.
pub const DEFAULT_THRESHOLD: usize = 10;

/// Nodes that open an extra path through a function.
const BRANCH_KINDS: &[&str] = &[
    "if_expression",
    "when_entry",
    "for_statement",
    "while_statement",
    "do_while_statement",
    "catch_block",
    "conjunction_expression",
    "disjunction_expression",
    "elvis_expression",
];

/// Reports functions whose McCabe complexity reaches a threshold.
#[derive(Debug, Clone)]
pub struct ComplexMethod {
    issue: Arc<Issue>,
    threshold: usize,
}

impl Default for ComplexMethod {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplexMethod {
    /// Creates the rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            issue: Arc::new(Issue::new(
                ID,
                Severity::Maintainability,
                "Complex methods are hard to understand and read. It might not be obvious what \
                 side-effects a complex method has. Prefer splitting up complex methods into \
                 smaller methods that are in turn easier to understand.",
                Debt::TWENTY_MINS,
            )),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Sets the complexity threshold.
    #[must_use]
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.issue = Arc::new(self.issue.as_ref().clone().with_severity(severity));
        self
    }
}

impl Rule for ComplexMethod {
    fn issue(&self) -> &Arc<Issue> {
        &self.issue
    }

    fn visit(&self, file: &SourceFile, findings: &mut Vec<Finding>) -> Result<(), ListenerError> {
        for function in descendants(file.root()).filter(|n| n.kind() == FUNCTION_KIND) {
            let complexity = complexity(function);
            if complexity < self.threshold {
                continue;
            }

            let entity = entity_of(file, function);
            debug!("{} has complexity {complexity}", entity.signature);
            let message = format!(
                "The function {} appears to be too complex ({complexity}).",
                entity.name
            );
            let metric = Metric::new(METRIC, to_value(complexity)).with_max(to_value(self.threshold));
            findings.push(Finding::thresholded(&self.issue, entity, metric, message));
        }
        Ok(())
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_value(count: usize) -> f64 {
    count as f64
}

/// McCabe complexity of one function, not counting nested functions.
#[must_use]
pub fn complexity(function: Node<'_>) -> usize {
    let mut count = 1;
    let mut cursor = function.walk();
    let mut stack: Vec<Node<'_>> = function.named_children(&mut cursor).collect();
    while let Some(node) = stack.pop() {
        if node.kind() == FUNCTION_KIND {
            continue;
        }
        if BRANCH_KINDS.contains(&node.kind()) {
            count += 1;
        }
        let mut cursor = node.walk();
        stack.extend(node.named_children(&mut cursor));
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktscan_core::{Compactable, FindingKind, HasMetrics};
    use ktscan_kotlin::KotlinParser;

    fn lint(rule: &ComplexMethod, code: &str) -> Vec<Finding> {
        let file = KotlinParser::new()
            .parse("Test.kt", code)
            .expect("test code should parse");
        let mut findings = Vec::new();
        rule.visit(&file, &mut findings).expect("rule should not fail");
        findings
    }

    const BRANCHY: &str = r#"
fun branchy(a: Int): Int {
    if (a == 1) { return 1 }
    if (a == 2) { return 2 }
    if (a == 3) { return 3 }
    return 0
}
"#;

    #[test]
    fn counts_branches() {
        let file = KotlinParser::new().parse("Test.kt", BRANCHY).unwrap();
        let function = descendants(file.root())
            .find(|n| n.kind() == FUNCTION_KIND)
            .unwrap();
        assert_eq!(complexity(function), 4);
    }

    #[test]
    fn reports_at_threshold() {
        let findings = lint(&ComplexMethod::new().threshold(4), BRANCHY);
        assert_eq!(findings.len(), 1);

        let finding = &findings[0];
        assert_eq!(
            finding.kind(),
            FindingKind::Thresholded {
                value: 4.0,
                threshold: 4.0
            }
        );
        assert_eq!(finding.metric_by_type(METRIC).map(|m| m.value), Some(4.0));
        insta::assert_snapshot!(finding.compact(), @"ComplexMethod - 4/4 - [branchy] at Test.kt:2:1");
    }

    #[test]
    fn quiet_below_threshold() {
        assert!(lint(&ComplexMethod::new(), BRANCHY).is_empty());
        assert!(lint(&ComplexMethod::new().threshold(5), BRANCHY).is_empty());
    }

    #[test]
    fn nested_functions_are_measured_separately() {
        let code = r#"
fun outer(a: Int) {
    fun inner(b: Int) {
        if (b == 1) { println(b) }
        if (b == 2) { println(b) }
    }
    inner(a)
}
"#;
        let findings = lint(&ComplexMethod::new().threshold(3), code);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name(), "inner");
    }
}
