//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! // ktscan: allow(UnnecessaryParentheses, ComplexMethod)
//! val x = (5) // ktscan: allow(UnnecessaryParentheses)
//! ```
//!
//! A trailing directive applies to its own line. A directive on a line of
//! its own applies to the line below it.

use std::collections::HashSet;

const DIRECTIVE_PREFIX: &str = "ktscan:";

/// Parsed suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule ids that are allowed; `all` allows every rule.
    pub rules: HashSet<String>,
}

impl AllowDirective {
    /// Returns true if the directive covers `rule_id`.
    #[must_use]
    pub fn allows(&self, rule_id: &str) -> bool {
        self.rules.contains(rule_id) || self.rules.contains("all")
    }
}

/// Checks whether a finding of `rule_id` at `line` (1-indexed) is suppressed.
#[must_use]
pub fn is_suppressed(content: &str, line: usize, rule_id: &str) -> bool {
    let Some(index) = line.checked_sub(1) else {
        return false;
    };
    let allows = |text: &str| parse_allow_directive(text).is_some_and(|d| d.allows(rule_id));

    let mut lines = content.lines().skip(index.saturating_sub(1));
    if index > 0 {
        let above = lines.next().unwrap_or_default();
        if above.trim_start().starts_with("//") && allows(above) {
            return true;
        }
    }
    lines.next().is_some_and(allows)
}

/// Parses a suppression directive from a line, leading or trailing comment.
#[must_use]
pub fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    line.match_indices("//").find_map(|(start, _)| {
        let comment = line[start..].trim_start_matches('/').trim_start();
        parse_directive_body(comment.strip_prefix(DIRECTIVE_PREFIX)?)
    })
}

fn parse_directive_body(body: &str) -> Option<AllowDirective> {
    let rest = body.trim().strip_prefix("allow(")?;
    let paren_end = rest.find(')')?;

    let rules: HashSet<String> = rest[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    Some(AllowDirective { rules })
}
