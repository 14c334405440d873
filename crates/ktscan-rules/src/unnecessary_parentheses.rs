//! Rule to flag parentheses that can be removed without changing meaning.
//!
//! # Detected Patterns
//!
//! - Parentheses around a property initializer: `val local = (5 + 3)`
//! - Parentheses around a value argument: `3.plus((5))`
//! - Doubled parentheses, including around `if`/`while` conditions
//! - Parentheses around a literal or a plain name
//! - A lambda passed as the only argument: `run({ work() })`

use ktscan_core::{Debt, Finding, Issue, ListenerError, Rule, Severity, SourceFile};
use ktscan_kotlin::entity_of;
use ktscan_kotlin::syntax::{collapse_whitespace, descendants};
use std::sync::Arc;
use tree_sitter::Node;

/// Rule id for unnecessary-parentheses.
pub const ID: &str = "UnnecessaryParentheses";

/// Parents in which a parenthesized expression never needs its parentheses.
const FREE_CONTEXTS: &[&str] = &[
    "property_declaration",
    "value_argument",
    "parenthesized_expression",
    "jump_expression",
    "assignment",
];

/// Parents whose condition is already wrapped in parentheses.
const CONDITION_CONTEXTS: &[&str] = &["if_expression", "while_statement", "do_while_statement"];

/// Expressions that bind tighter than any operator.
const ATOMIC_KINDS: &[&str] = &[
    "identifier",
    "number_literal",
    "integer_literal",
    "float_literal",
    "real_literal",
    "long_literal",
    "hex_literal",
    "bin_literal",
    "boolean_literal",
    "character_literal",
    "string_literal",
    "null_literal",
    "this_expression",
];

/// Flags parentheses that can be removed.
#[derive(Debug, Clone)]
pub struct UnnecessaryParentheses {
    issue: Arc<Issue>,
}

impl Default for UnnecessaryParentheses {
    fn default() -> Self {
        Self::new()
    }
}

impl UnnecessaryParentheses {
    /// Creates the rule with its default severity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            issue: Arc::new(Issue::new(
                ID,
                Severity::Style,
                "Unnecessary parentheses don't add any value to the code and should be removed.",
                Debt::FIVE_MINS,
            )),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(self, severity: Severity) -> Self {
        Self {
            issue: Arc::new(self.issue.as_ref().clone().with_severity(severity)),
        }
    }

    fn report(&self, file: &SourceFile, node: Node<'_>, message: String) -> Finding {
        Finding::new(&self.issue, entity_of(file, node), message)
    }
}

impl Rule for UnnecessaryParentheses {
    fn issue(&self) -> &Arc<Issue> {
        &self.issue
    }

    fn visit(&self, file: &SourceFile, findings: &mut Vec<Finding>) -> Result<(), ListenerError> {
        for node in descendants(file.root()) {
            match node.kind() {
                "parenthesized_expression" if is_useless(node) => {
                    let inner = node
                        .named_child(0)
                        .map_or_else(String::new, |n| collapse_whitespace(file.text(n)));
                    let message = format!(
                        "Parentheses in {} are unnecessary and can be replaced with: {inner}",
                        collapse_whitespace(file.text(node)),
                    );
                    findings.push(self.report(file, node, message));
                }
                "call_expression" => {
                    if let Some(arguments) = sole_lambda_arguments(node) {
                        let message = format!(
                            "Parentheses around the lambda in {} are unnecessary",
                            collapse_whitespace(file.text(node)),
                        );
                        findings.push(self.report(file, arguments, message));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn is_useless(node: Node<'_>) -> bool {
    let Some(inner) = node.named_child(0) else {
        return false;
    };
    if ATOMIC_KINDS.contains(&inner.kind()) {
        return true;
    }
    let Some(parent) = node.parent() else {
        return false;
    };
    if FREE_CONTEXTS.contains(&parent.kind()) {
        return true;
    }
    CONDITION_CONTEXTS.contains(&parent.kind())
        && node.prev_sibling().is_some_and(|prev| prev.kind() == "(")
}

/// The argument list of `f({ ... })`, where the lambda could move outside.
fn sole_lambda_arguments(call: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = call.walk();
    let mut children: Vec<Node<'_>> = Vec::new();
    for child in call.named_children(&mut cursor) {
        if child.kind() == "call_suffix" {
            let mut inner = child.walk();
            children.extend(child.named_children(&mut inner));
        } else {
            children.push(child);
        }
    }
    if children.iter().any(|n| n.kind() == "annotated_lambda") {
        return None;
    }
    let arguments = children.into_iter().find(|n| n.kind() == "value_arguments")?;

    let mut cursor = arguments.walk();
    let values: Vec<Node<'_>> = arguments
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "value_argument")
        .collect();
    let [argument] = values.as_slice() else {
        return None;
    };

    let mut cursor = argument.walk();
    let expressions: Vec<Node<'_>> = argument.named_children(&mut cursor).collect();
    match expressions.as_slice() {
        [expression] if expression.kind() == "lambda_literal" => Some(arguments),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktscan_core::Compactable;
    use ktscan_kotlin::KotlinParser;

    fn lint(code: &str) -> Vec<Finding> {
        let file = KotlinParser::new()
            .parse("Test.kt", code)
            .expect("test code should parse");
        let mut findings = Vec::new();
        UnnecessaryParentheses::new()
            .visit(&file, &mut findings)
            .expect("rule should not fail");
        findings
    }

    #[test]
    fn flags_val_assignment() {
        let findings = lint("val local = (5)");
        assert_eq!(findings.len(), 1);
        insta::assert_snapshot!(findings[0].compact(), @"UnnecessaryParentheses - [(5)] at Test.kt:1:13");
    }

    #[test]
    fn flags_val_assignment_operation() {
        assert_eq!(lint("val local = (5 + 3)").len(), 1);
    }

    #[test]
    fn flags_function_argument() {
        assert_eq!(lint("val local = 3.plus((5))").len(), 1);
    }

    #[test]
    fn flags_doubled_condition_parentheses() {
        let code = r#"
fun x(a: String, b: String) {
    if ((a == b)) {
        println("Test")
    }
}
"#;
        assert_eq!(lint(code).len(), 1);
    }

    #[test]
    fn flags_doubled_infix_condition() {
        let code = r#"
fun x(a: String, b: String) {
    if ((a equals b)) {
        println("Test")
    }
}
"#;
        let findings = lint(code);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name(), "(a equals b)");
    }

    #[test]
    fn ignores_single_infix_condition() {
        let code = r#"
fun x(a: String, b: String) {
    if (a equals b) {
        println("Test")
    }
}
"#;
        assert!(lint(code).is_empty());
    }

    #[test]
    fn ignores_lambda_passed_to_super_constructor() {
        let code = r#"
class TestSpek : SubjectSpek({
    describe("a simple test") {
        it("should do something") {
        }
    }
})
"#;
        assert!(lint(code).is_empty());
    }

    #[test]
    fn flags_sole_lambda_argument() {
        let code = r#"
fun function(a: (input: String) -> Unit) {
    a.invoke("TEST")
}

fun test() {
    function({ input -> println(input) })
}
"#;
        let findings = lint(code);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message().contains("lambda"));
    }

    #[test]
    fn ignores_lambda_with_other_arguments() {
        let code = r#"
fun test() {
    function(1, { input -> println(input) })
}
"#;
        assert!(lint(code).is_empty());
    }

    #[test]
    fn ignores_well_behaved_code() {
        let code = r#"
fun x(a: String, b: String) {
    if (a == b) {
        println("Test")
    }
    val c = (1 + 2) * 3
}
"#;
        assert!(lint(code).is_empty());
    }

    #[test]
    fn ignores_plain_initializer() {
        assert!(lint("val local = 5").is_empty());
    }

    #[test]
    fn severity_override_keeps_id() {
        let rule = UnnecessaryParentheses::new().severity(Severity::Warning);
        assert_eq!(rule.issue().id, ID);
        assert_eq!(rule.issue().severity, Severity::Warning);
    }
}
