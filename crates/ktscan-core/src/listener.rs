//! Listener traits implemented by rules and processors.

use crate::config::RuleConfig;
use crate::file::SourceFile;
use crate::finding::Finding;
use crate::issue::Issue;
use crate::metric::ProjectMetric;
use crate::report::{Detection, ReportError};
use crate::suppression::is_suppressed;
use crate::user_data::{Key, UserData};
use std::any::Any;
use std::sync::Arc;

/// Error a listener returns from one of its callbacks.
///
/// The analyzer records it against the file (or the run) and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Listener-specific failure.
    #[error("{0}")]
    Message(String),

    /// The detection rejected a result.
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl ListenerError {
    /// Creates a listener-specific error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// What a listener sees while one file is processed.
pub struct FileContext<'a> {
    file: &'a SourceFile,
    data: &'a mut UserData,
    config: &'a RuleConfig,
    detection: &'a Detection,
}

impl<'a> FileContext<'a> {
    /// Creates a context for one (file, listener) pair.
    #[must_use]
    pub fn new(
        file: &'a SourceFile,
        data: &'a mut UserData,
        config: &'a RuleConfig,
        detection: &'a Detection,
    ) -> Self {
        Self {
            file,
            data,
            config,
            detection,
        }
    }

    /// The file being processed.
    #[must_use]
    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    /// This listener's parameter bag.
    #[must_use]
    pub fn config(&self) -> &'a RuleConfig {
        self.config
    }

    /// This listener's scratch data for the file.
    pub fn user_data(&mut self) -> &mut UserData {
        &mut *self.data
    }

    /// Stores a scratch value for the finish phase.
    pub fn put<T: Any + Send + Sync>(&mut self, key: &Key<T>, value: T) {
        self.data.put(key, value);
    }

    /// Reads a scratch value stored earlier for this file.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Option<&T> {
        self.data.get(key)
    }

    /// Reports a finding.
    ///
    /// # Errors
    ///
    /// Returns an error if the detection no longer accepts findings.
    pub fn report(&self, finding: Finding) -> Result<(), ListenerError> {
        self.detection.add_finding(finding)?;
        Ok(())
    }
}

/// A file that completed the per-file phase, with this listener's scratch data.
#[derive(Debug, Clone, Copy)]
pub struct ProcessedFile<'a> {
    /// The file.
    pub file: &'a SourceFile,
    /// Scratch data the listener stored for it.
    pub data: &'a UserData,
}

/// What a listener sees during the finish phase.
pub struct FinishContext<'a> {
    files: Vec<ProcessedFile<'a>>,
    config: &'a RuleConfig,
    detection: &'a Detection,
}

impl<'a> FinishContext<'a> {
    /// Creates a finish context for one listener.
    #[must_use]
    pub fn new(
        files: Vec<ProcessedFile<'a>>,
        config: &'a RuleConfig,
        detection: &'a Detection,
    ) -> Self {
        Self {
            files,
            config,
            detection,
        }
    }

    /// Every file that completed the per-file phase.
    #[must_use]
    pub fn files(&self) -> &[ProcessedFile<'a>] {
        &self.files
    }

    /// This listener's parameter bag.
    #[must_use]
    pub fn config(&self) -> &'a RuleConfig {
        self.config
    }

    /// The values stored under `key`, one per file that has one.
    pub fn values<'s, T: Any + Send + Sync>(
        &'s self,
        key: &'s Key<T>,
    ) -> impl Iterator<Item = &'a T> + 's {
        self.files.iter().filter_map(move |f| f.data.get(key))
    }

    /// Number of findings reported so far by all listeners.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.detection.finding_count()
    }

    /// Snapshot of the findings reported so far for one rule.
    #[must_use]
    pub fn findings_for(&self, rule_id: &str) -> Vec<Finding> {
        self.detection.findings_for(rule_id)
    }

    /// Adds a run-scoped metric.
    ///
    /// # Errors
    ///
    /// Returns an error if the detection no longer accepts results.
    pub fn add_project_metric(&self, metric: ProjectMetric) -> Result<(), ListenerError> {
        self.detection.add_project_metric(metric)?;
        Ok(())
    }

    /// Reports a finding that needs whole-run knowledge.
    ///
    /// # Errors
    ///
    /// Returns an error if the detection no longer accepts findings.
    pub fn report(&self, finding: Finding) -> Result<(), ListenerError> {
        self.detection.add_finding(finding)?;
        Ok(())
    }
}

/// A rule or processor driven by the analyzer.
///
/// `on_process` runs once per parsed file, possibly on several worker
/// threads at once for different files. `on_finish` runs exactly once after
/// every file has been processed by every listener. Aggregations in
/// `on_finish` must not depend on the order files were processed in.
pub trait Listener: Send + Sync {
    /// Unique id, also the key of this listener's configuration.
    fn id(&self) -> &str;

    /// Ids of listeners that must be registered before this one.
    fn depends_on(&self) -> &[&'static str] {
        &[]
    }

    /// Processes one file.
    ///
    /// # Errors
    ///
    /// An error is recorded against the file; other files and listeners
    /// are unaffected.
    fn on_process(&self, _ctx: &mut FileContext<'_>) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Aggregates over all processed files.
    ///
    /// # Errors
    ///
    /// An error is recorded against the run; other listeners still finish.
    fn on_finish(&self, _ctx: &mut FinishContext<'_>) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Type alias for boxed listener trait objects.
pub type ListenerBox = Box<dyn Listener>;

/// A single-issue detector that inspects one file at a time.
///
/// Every `Rule` is a [`Listener`] whose id is the issue id. Findings on a
/// line covered by a `// ktscan: allow(...)` directive for the issue are
/// dropped before they reach the report.
pub trait Rule: Send + Sync {
    /// The issue shared by every finding of this rule.
    fn issue(&self) -> &Arc<Issue>;

    /// Inspects a file, pushing findings in discovery order.
    ///
    /// # Errors
    ///
    /// Findings pushed before the error are still reported.
    fn visit(&self, file: &SourceFile, findings: &mut Vec<Finding>) -> Result<(), ListenerError>;
}

impl<R: Rule> Listener for R {
    fn id(&self) -> &str {
        &self.issue().id
    }

    fn on_process(&self, ctx: &mut FileContext<'_>) -> Result<(), ListenerError> {
        let mut findings = Vec::new();
        let outcome = self.visit(ctx.file(), &mut findings);

        let content = ctx.file().content();
        for finding in findings {
            if is_suppressed(content, finding.start_position().line, finding.id()) {
                continue;
            }
            ctx.report(finding)?;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::issue::{Debt, Severity};
    use crate::location::Location;
    use tree_sitter::Parser;

    fn parse(code: &str) -> SourceFile {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_kotlin_ng::LANGUAGE.into())
            .expect("kotlin grammar should load");
        let tree = parser.parse(code, None).expect("parser should produce a tree");
        SourceFile::new("Test.kt", code, tree)
    }

    /// Flags every line-leading `val`.
    struct ValRule {
        issue: Arc<Issue>,
    }

    impl ValRule {
        fn new() -> Self {
            Self {
                issue: Arc::new(Issue::new("ValRule", Severity::Style, "val", Debt::FIVE_MINS)),
            }
        }
    }

    impl Rule for ValRule {
        fn issue(&self) -> &Arc<Issue> {
            &self.issue
        }

        fn visit(
            &self,
            file: &SourceFile,
            findings: &mut Vec<Finding>,
        ) -> Result<(), ListenerError> {
            let root = file.root();
            let mut cursor = root.walk();
            for child in root.named_children(&mut cursor) {
                if file.text(child).starts_with("val") {
                    let entity = Entity::new("val", "sig", "", Location::from_node(file, child));
                    findings.push(Finding::new(&self.issue, entity, "val found"));
                }
            }
            Ok(())
        }
    }

    fn run(rule: &ValRule, code: &str) -> Vec<Finding> {
        let file = parse(code);
        let detection = Detection::new();
        let mut data = UserData::new();
        let config = RuleConfig::default();
        let mut ctx = FileContext::new(&file, &mut data, &config, &detection);
        rule.on_process(&mut ctx).expect("rule should succeed");
        detection.findings_for("ValRule")
    }

    #[test]
    fn rule_is_a_listener_named_after_its_issue() {
        let rule = ValRule::new();
        assert_eq!(Listener::id(&rule), "ValRule");
        assert!(rule.depends_on().is_empty());
    }

    #[test]
    fn rule_findings_reach_the_detection() {
        let findings = run(&ValRule::new(), "val a = 1\nval b = 2\n");
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn allow_comment_suppresses_rule_findings() {
        let findings = run(
            &ValRule::new(),
            "// ktscan: allow(ValRule)\nval a = 1\nval b = 2\n",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].start_position().line, 3);
    }

    #[test]
    fn finish_context_collects_values_per_file() {
        const KEY: Key<u32> = Key::new("n");
        let a = parse("val a = 1");
        let b = parse("val b = 2");
        let mut data_a = UserData::new();
        data_a.put(&KEY, 4);
        let data_b = UserData::new();

        let detection = Detection::new();
        let config = RuleConfig::default();
        let ctx = FinishContext::new(
            vec![
                ProcessedFile {
                    file: &a,
                    data: &data_a,
                },
                ProcessedFile {
                    file: &b,
                    data: &data_b,
                },
            ],
            &config,
            &detection,
        );

        assert_eq!(ctx.files().len(), 2);
        assert_eq!(ctx.values(&KEY).copied().collect::<Vec<_>>(), vec![4]);

        ctx.add_project_metric(ProjectMetric::new("n", 4.0))
            .expect("metric should be accepted");
        let report = detection.seal().expect("first seal succeeds");
        assert_eq!(report.project_metrics().len(), 1);
    }
}
