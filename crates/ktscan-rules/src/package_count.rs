//! Processor counting the distinct packages of a run.

use ktscan_core::{FileContext, FinishContext, Key, Listener, ListenerError, ProjectMetric};
use ktscan_kotlin::syntax::package_name;
use std::collections::BTreeSet;

/// Listener id of the package counter.
pub const ID: &str = "PackageCountProcessor";

/// Scratch key holding a file's package name; also the metric type.
pub const NUMBER_OF_PACKAGES: Key<String> = Key::new("number of packages");

/// Adds a `number of packages` project metric.
///
/// A file without a package header belongs to the default package, which
/// counts as one package of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageCountProcessor;

impl PackageCountProcessor {
    /// Creates the processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Listener for PackageCountProcessor {
    fn id(&self) -> &str {
        ID
    }

    fn on_process(&self, ctx: &mut FileContext<'_>) -> Result<(), ListenerError> {
        let package = package_name(ctx.file()).unwrap_or_default();
        ctx.put(&NUMBER_OF_PACKAGES, package);
        Ok(())
    }

    fn on_finish(&self, ctx: &mut FinishContext<'_>) -> Result<(), ListenerError> {
        let packages: BTreeSet<&String> = ctx.values(&NUMBER_OF_PACKAGES).collect();
        ctx.add_project_metric(ProjectMetric::from_count(
            NUMBER_OF_PACKAGES.name(),
            packages.len(),
        ))
    }
}
