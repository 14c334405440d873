//! End-to-end runs of the analyzer with the built-in listeners.

use ktscan_core::{
    AnalysisError, Analyzer, CancellationToken, Compactable, Config, FileContext, Listener,
    ListenerError, ParseOutcome, Report,
};
use ktscan_kotlin::KotlinParser;
use ktscan_rules::{all_listeners, listeners_from_config, PackageCountProcessor, UnnecessaryParentheses};
use std::path::Path;

fn parse_all(sources: &[(&str, &str)]) -> Vec<ParseOutcome> {
    let parser = KotlinParser::new();
    sources
        .iter()
        .map(|(path, code)| parser.parse(path, *code))
        .collect()
}

fn run(threads: usize, sources: &[(&str, &str)]) -> Report {
    Analyzer::builder()
        .listeners(all_listeners())
        .parallelism(threads)
        .build()
        .expect("Failed to build analyzer")
        .analyze(parse_all(sources))
}

fn compacts(report: &Report) -> Vec<String> {
    report.all_findings().map(Compactable::compact_with_signature).collect()
}

const PROJECT: &[(&str, &str)] = &[
    ("A.kt", "package com.x\n\nval a = (5)\n"),
    ("B.kt", "package com.x\n\nclass B {\n    fun b() = 1\n}\n"),
    ("C.kt", "package com.y\n\nobject C {\n    fun c(x: Int) = x + 1\n}\n"),
];

#[test]
fn counts_distinct_packages() {
    let report = Analyzer::builder()
        .listener(PackageCountProcessor::new())
        .build()
        .expect("Failed to build analyzer")
        .analyze(parse_all(PROJECT));

    let metric = report
        .project_metric("number of packages")
        .expect("package count should be reported");
    assert!((metric.value - 2.0).abs() < f64::EPSILON);
}

#[test]
fn default_package_counts_as_a_package() {
    let analyzer = Analyzer::builder()
        .listener(PackageCountProcessor::new())
        .build()
        .expect("Failed to build analyzer");

    let report = analyzer.analyze(parse_all(&[
        ("A.kt", "package com.x\n\nval a = 1\n"),
        ("B.kt", "val b = 1\n"),
        ("C.kt", "fun c() = 2\n"),
    ]));
    assert_eq!(
        report.project_metric("number of packages").map(|m| m.value),
        Some(2.0)
    );
}

#[test]
fn flags_unnecessary_parentheses_once() {
    let analyzer = Analyzer::builder()
        .listener(UnnecessaryParentheses::new())
        .build()
        .expect("Failed to build analyzer");

    let report = analyzer.analyze(parse_all(&[("Test.kt", "val local = (5)")]));
    assert_eq!(report.finding_count(), 1);
    assert_eq!(
        report.all_findings().next().map(|f| f.id().to_string()),
        Some("UnnecessaryParentheses".to_string())
    );

    let report = analyzer.analyze(parse_all(&[("Test.kt", "val local = 5")]));
    assert_eq!(report.finding_count(), 0);
}

#[test]
fn project_metrics_are_summed() {
    let report = run(2, PROJECT);
    let value = |t: &str| report.project_metric(t).map(|m| m.value);

    assert_eq!(value("number of classes"), Some(2.0));
    assert_eq!(value("number of functions"), Some(2.0));
    assert_eq!(value("lines of code"), Some(10.0));
    assert_eq!(report.files_analyzed(), 3);
}

#[test]
fn repeated_runs_are_identical() {
    let analyzer = Analyzer::builder()
        .listeners(all_listeners())
        .build()
        .expect("Failed to build analyzer");

    let first = analyzer.analyze(parse_all(PROJECT));
    let second = analyzer.analyze(parse_all(PROJECT));
    assert_eq!(compacts(&first), compacts(&second));
    assert_eq!(first.project_metrics(), second.project_metrics());
}

#[test]
fn pool_size_does_not_change_results() {
    let sources: Vec<(String, String)> = (0..24)
        .map(|i| {
            (
                format!("File{i:02}.kt"),
                format!("package p{}\n\nval v{i} = ({i})\n", i % 5),
            )
        })
        .collect();
    let sources: Vec<(&str, &str)> = sources
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();

    let single = run(1, &sources);
    let many = run(8, &sources);
    assert_eq!(single.finding_count(), 24);
    assert_eq!(compacts(&single), compacts(&many));
    assert_eq!(single.project_metrics(), many.project_metrics());
}

#[test]
fn parse_failures_never_reach_listeners() {
    let report = run(
        2,
        &[
            ("Good.kt", "package ok\n\nval a = (1)\n"),
            ("Broken.kt", "package broken\n\nfun broken( {\n"),
        ],
    );

    assert_eq!(report.files_analyzed(), 1);
    assert_eq!(report.finding_count(), 1);
    assert!(matches!(
        report.errors_for(Path::new("Broken.kt")),
        [AnalysisError::Parse { .. }]
    ));
    let packages = report.project_metric("number of packages").map(|m| m.value);
    assert_eq!(packages, Some(1.0));
}

struct Faulty;

impl Listener for Faulty {
    fn id(&self) -> &str {
        "Faulty"
    }

    fn on_process(&self, ctx: &mut FileContext<'_>) -> Result<(), ListenerError> {
        match ctx.file().path().to_str() {
            Some("Bad.kt") => Err(ListenerError::new("cannot handle this file")),
            Some("Panic.kt") => panic!("listener bug"),
            _ => Ok(()),
        }
    }
}

#[test]
fn listener_faults_are_isolated() {
    let report = Analyzer::builder()
        .listener(Faulty)
        .listener(PackageCountProcessor::new())
        .listener(UnnecessaryParentheses::new())
        .build()
        .expect("Failed to build analyzer")
        .analyze(parse_all(&[
            ("Bad.kt", "package a\n\nval x = (1)\n"),
            ("Panic.kt", "package b\n\nval y = (2)\n"),
            ("Fine.kt", "package c\n\nval z = (3)\n"),
        ]));

    assert_eq!(report.finding_count(), 3);
    assert_eq!(report.files_analyzed(), 3);
    assert!(matches!(
        report.errors_for(Path::new("Bad.kt")),
        [AnalysisError::Listener { listener, .. }] if listener == "Faulty"
    ));
    assert!(matches!(
        report.errors_for(Path::new("Panic.kt")),
        [AnalysisError::Panicked { message, .. }] if message == "listener bug"
    ));
    assert_eq!(
        report.project_metric("number of packages").map(|m| m.value),
        Some(3.0)
    );
}

#[test]
fn cancelled_runs_record_unprocessed_files() {
    let token = CancellationToken::new();
    token.cancel();

    let report = Analyzer::builder()
        .listeners(all_listeners())
        .cancellation(token)
        .build()
        .expect("Failed to build analyzer")
        .analyze(parse_all(PROJECT));

    assert_eq!(report.files_analyzed(), 0);
    assert_eq!(report.finding_count(), 0);
    assert_eq!(report.errors().len(), 3);
    assert!(report
        .errors()
        .values()
        .all(|errors| errors == &[AnalysisError::Cancelled]));
    assert_eq!(
        report.project_metric("number of packages").map(|m| m.value),
        Some(0.0)
    );
}

#[test]
fn configuration_shapes_the_run() {
    let config = Config::parse(
        r#"
[rules.UnnecessaryParentheses]
enabled = false

[rules.ComplexMethod]
threshold = 1
severity = "warning"
"#,
    )
    .expect("config parses");

    let report = Analyzer::builder()
        .listeners(listeners_from_config(&config))
        .config(config)
        .build()
        .expect("Failed to build analyzer")
        .analyze(parse_all(PROJECT));

    assert!(report.findings_for("UnnecessaryParentheses").is_empty());
    let complex = report.findings_for("ComplexMethod");
    assert_eq!(complex.len(), 2);
    assert!(complex
        .iter()
        .all(|f| f.severity() == ktscan_core::Severity::Warning));
}

#[test]
fn suppression_comments_drop_findings() {
    let report = run(
        1,
        &[(
            "S.kt",
            "// ktscan: allow(UnnecessaryParentheses)\nval a = (1)\nval b = (2)\n",
        )],
    );
    let lines: Vec<usize> = report
        .findings_for("UnnecessaryParentheses")
        .iter()
        .map(|f| f.start_position().line)
        .collect();
    assert_eq!(lines, vec![3]);
}
