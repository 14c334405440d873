//! Shared output formatting for reports.

use anyhow::Result;
use ktscan_core::{Compactable, Report, Severity};
use std::fmt::{self, Write as _};

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(report)?,
        OutputFormat::Json => serde_json::to_string_pretty(report)? + "\n",
        OutputFormat::Compact => render_compact(report)?,
    };
    print!("{rendered}");
    Ok(())
}

fn severity_indicator(severity: Severity) -> String {
    let color = match severity {
        Severity::Defect | Severity::Security => "\x1b[31m",
        Severity::Warning | Severity::Performance => "\x1b[33m",
        _ => "\x1b[34m",
    };
    format!("{color}{severity}\x1b[0m")
}

/// Human-readable report with findings, metrics, errors and a summary.
pub fn render_text(report: &Report) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_findings(&mut out, report)?;
    write_metrics(&mut out, report)?;
    write_errors(&mut out, report)?;
    write_summary(&mut out, report)?;
    Ok(out)
}

fn write_findings(out: &mut String, report: &Report) -> fmt::Result {
    for finding in report.all_findings() {
        writeln!(out, "{} at {}", finding.id(), finding.location())?;
        writeln!(
            out,
            "  {}: {}",
            severity_indicator(finding.severity()),
            finding.message()
        )?;
        writeln!(out, "  = debt: {}\n", finding.issue().debt)?;
    }
    Ok(())
}

fn write_metrics(out: &mut String, report: &Report) -> fmt::Result {
    let mut metrics: Vec<_> = report.project_metrics().iter().collect();
    if metrics.is_empty() {
        return Ok(());
    }
    metrics.sort_by(|a, b| a.metric_type.cmp(&b.metric_type));
    writeln!(out, "Project metrics:")?;
    for metric in metrics {
        writeln!(out, "  {metric}")?;
    }
    writeln!(out)
}

fn write_errors(out: &mut String, report: &Report) -> fmt::Result {
    for (path, errors) in report.errors() {
        for error in errors {
            writeln!(out, "\x1b[31merror\x1b[0m {}: {error}", path.display())?;
        }
    }
    for error in report.run_errors() {
        writeln!(out, "\x1b[31merror\x1b[0m {error}")?;
    }
    Ok(())
}

fn write_summary(out: &mut String, report: &Report) -> fmt::Result {
    let summary_color = if report.has_errors() {
        "\x1b[31m"
    } else if report.finding_count() > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    let breakdown: Vec<String> = report
        .count_by_severity()
        .iter()
        .map(|(severity, count)| format!("{count} {severity}"))
        .collect();

    write!(out, "{summary_color}Found {} finding(s)", report.finding_count())?;
    if !breakdown.is_empty() {
        write!(out, " ({})", breakdown.join(", "))?;
    }
    writeln!(
        out,
        " in {} file(s), {} file(s) with errors\x1b[0m",
        report.files_analyzed(),
        report.errors().len()
    )
}

/// One line per finding, suitable for diffing and baselines.
pub fn render_compact(report: &Report) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for finding in report.all_findings() {
        writeln!(out, "{}", finding.compact())?;
    }
    Ok(out)
}
