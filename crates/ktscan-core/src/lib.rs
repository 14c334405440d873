//! # ktscan-core
//!
//! Core framework for Kotlin static analysis over `tree-sitter` syntax trees.
//!
//! This crate provides the model and the run coordinator. It includes:
//!
//! - [`Finding`], [`Entity`], [`Issue`] and [`Metric`] for describing results
//! - [`Listener`] for processors and [`Rule`] for single-issue detectors
//! - [`Analyzer`] for driving listeners across files on a worker pool
//! - [`Report`] for the sealed, read-only result of a run
//!
//! ## Example
//!
//! ```ignore
//! use ktscan_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .listener(MyRule::new())
//!     .parallelism(4)
//!     .build()?;
//!
//! let report = analyzer.analyze(parsed_files);
//! for finding in report.all_findings() {
//!     println!("{}", finding.compact());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod attributes;
mod baseline;
mod config;
mod entity;
mod file;
mod finding;
mod issue;
mod listener;
mod location;
mod metric;
mod report;
mod user_data;

/// Comment-based suppression of findings.
pub mod suppression;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, CancellationToken};
pub use attributes::{AttributeRegistry, AttributeValue, Attributes, Getter};
pub use baseline::{Baseline, BaselineError};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use entity::Entity;
pub use file::{ParseFailure, ParseOutcome, SourceFile};
pub use finding::{Compactable, Finding, FindingBuilder, FindingKind};
pub use issue::{Debt, Issue, Severity};
pub use listener::{
    FileContext, FinishContext, Listener, ListenerBox, ListenerError, ProcessedFile, Rule,
};
pub use location::{Location, SourceLocation, TextRange};
pub use metric::{HasMetrics, Metric, ProjectMetric};
pub use report::{AnalysisError, Detection, Report, ReportError};
pub use user_data::{Key, UserData};
