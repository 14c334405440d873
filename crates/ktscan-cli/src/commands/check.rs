//! Check command implementation.

use anyhow::{Context, Result};
use clap::Args;
use ktscan_core::{Analyzer, Baseline, ListenerBox, ParseOutcome};
use ktscan_kotlin::KotlinParser;
use ktscan_rules::listeners_from_config;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config_resolver::ResolvedConfig;
use crate::OutputFormat;

/// Arguments of the check command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to analyze (default: `analyzer.root` from the config)
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Only run specific listeners (comma-separated ids)
    #[arg(long)]
    pub rules: Option<String>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Stop the run after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Hide findings accepted in this baseline file
    #[arg(long)]
    pub baseline: Option<PathBuf>,

    /// Write all findings to this baseline file
    #[arg(long)]
    pub create_baseline: Option<PathBuf>,
}

/// Runs the check command.
///
/// Returns `Ok(false)` when findings or analysis errors remain.
pub fn run(args: &CheckArgs, resolved: &ResolvedConfig) -> Result<bool> {
    if let Some(origin) = &resolved.origin {
        tracing::debug!("Using config: {}", origin.display());
    }
    let root = resolved.analysis_root(args.path.as_deref());
    let mut config = resolved.config.clone();
    config.analyzer.exclude.extend(args.exclude.iter().cloned());

    let listeners = select_listeners(listeners_from_config(&config), args.rules.as_deref());

    let mut builder = Analyzer::builder().listeners(listeners);
    if let Some(threads) = args.threads {
        builder = builder.parallelism(threads);
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let analyzer = builder
        .config(config.clone())
        .build()
        .context("Failed to build analyzer")?;

    let files = discover_files(&root, &config.analyzer.exclude)?;
    tracing::info!(
        "Analyzing {} with {} listeners",
        root.display(),
        analyzer.listener_count()
    );

    let report = analyzer.analyze(parse_files(&files));

    if let Some(path) = &args.create_baseline {
        Baseline::from_report(&report)
            .write(path)
            .with_context(|| format!("Failed to write baseline: {}", path.display()))?;
        tracing::info!("Wrote baseline to {}", path.display());
    }

    let report = match &args.baseline {
        Some(path) => Baseline::from_file(path)
            .with_context(|| format!("Failed to load baseline: {}", path.display()))?
            .filter(&report),
        None => report,
    };

    super::output::print(&report, args.format)?;

    Ok(report.finding_count() == 0 && !report.has_errors())
}

/// Keeps only the listeners named in a comma-separated filter.
fn select_listeners(listeners: Vec<ListenerBox>, filter: Option<&str>) -> Vec<ListenerBox> {
    let Some(filter) = filter else {
        return listeners;
    };
    let wanted: Vec<&str> = filter.split(',').map(str::trim).collect();
    for name in &wanted {
        if !listeners.iter().any(|l| l.id() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }
    listeners
        .into_iter()
        .filter(|l| wanted.contains(&l.id()))
        .collect()
}

fn parse_files(files: &[PathBuf]) -> Vec<ParseOutcome> {
    let parser = KotlinParser::new();
    files.par_iter().map(|path| parser.parse_file(path)).collect()
}

/// Finds Kotlin files below `root`, honoring `.gitignore` and exclude globs.
fn discover_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let patterns = exclude
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || !KotlinParser::handles(path) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if patterns
            .iter()
            .any(|p| p.matches_path(path) || p.matches_path(relative))
        {
            tracing::debug!("Excluding: {}", path.display());
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
