//! Run coordinator: drives listeners across parsed files.

use crate::config::{Config, RuleConfig};
use crate::file::{ParseOutcome, SourceFile};
use crate::listener::{FileContext, FinishContext, Listener, ListenerBox, ProcessedFile};
use crate::report::{AnalysisError, Detection, Report, ReportError};
use crate::user_data::UserData;

use rayon::prelude::*;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal setup errors. When one occurs no file is processed.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Two listeners share an id.
    #[error("listener '{0}' is registered more than once")]
    DuplicateListener(String),

    /// A listener depends on one that is not registered or is disabled.
    #[error("listener '{listener}' depends on '{dependency}', which is not registered")]
    MissingDependency {
        /// Dependent listener.
        listener: String,
        /// Missing dependency.
        dependency: String,
    },

    /// A listener is registered before one it depends on.
    #[error("listener '{listener}' must be registered after '{dependency}'")]
    DependencyOrder {
        /// Dependent listener.
        listener: String,
        /// Dependency registered too late.
        dependency: String,
    },

    /// The worker pool could not be created.
    #[error("failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Shared flag to stop a run early.
///
/// Files already being processed finish; files not yet started are recorded
/// as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    listeners: Vec<ListenerBox>,
    config: Option<Config>,
    parallelism: Option<usize>,
    timeout: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Listeners run in registration order per file.
    #[must_use]
    pub fn listener<L: Listener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Registers a boxed listener.
    #[must_use]
    pub fn listener_box(mut self, listener: ListenerBox) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Registers several boxed listeners.
    #[must_use]
    pub fn listeners(mut self, listeners: impl IntoIterator<Item = ListenerBox>) -> Self {
        self.listeners.extend(listeners);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the number of worker threads, overriding the configuration.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Sets a run-level timeout, overriding the configuration.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses an external cancellation token.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Builds the analyzer.
    ///
    /// Disabled listeners are dropped here; the remaining list is fixed for
    /// the lifetime of the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate listener ids, unresolvable or
    /// mis-ordered dependencies, or if the worker pool cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let mut listeners = Vec::with_capacity(self.listeners.len());
        for listener in self.listeners {
            if !config.is_rule_enabled(listener.id()) {
                debug!("Skipping disabled listener: {}", listener.id());
                continue;
            }
            let rule_config = config.rule_config(listener.id());
            listeners.push(Registered {
                listener,
                config: rule_config,
            });
        }
        validate(&listeners)?;

        let mut pool = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("ktscan-{i}"));
        if let Some(threads) = self.parallelism.or(config.analyzer.parallelism) {
            pool = pool.num_threads(threads);
        }

        Ok(Analyzer {
            listeners,
            pool: pool.build()?,
            timeout: self.timeout.or_else(|| config.analyzer.timeout()),
            cancellation: self.cancellation.unwrap_or_default(),
        })
    }
}

fn validate(listeners: &[Registered]) -> Result<(), AnalyzerError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for registered in listeners {
        let id = registered.listener.id();
        if !seen.insert(id) {
            return Err(AnalyzerError::DuplicateListener(id.to_string()));
        }
    }

    for (position, registered) in listeners.iter().enumerate() {
        for dependency in registered.listener.depends_on() {
            let found = listeners
                .iter()
                .position(|other| other.listener.id() == *dependency);
            match found {
                None => {
                    return Err(AnalyzerError::MissingDependency {
                        listener: registered.listener.id().to_string(),
                        dependency: (*dependency).to_string(),
                    })
                }
                Some(index) if index > position => {
                    return Err(AnalyzerError::DependencyOrder {
                        listener: registered.listener.id().to_string(),
                        dependency: (*dependency).to_string(),
                    })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

struct Registered {
    listener: ListenerBox,
    config: RuleConfig,
}

/// Drives registered listeners across parsed files and builds the report.
///
/// Use [`Analyzer::builder()`] to construct an instance. The analyzer keeps
/// no state between runs, so analyzing the same files twice yields the same
/// report.
pub struct Analyzer {
    listeners: Vec<Registered>,
    pool: rayon::ThreadPool,
    timeout: Option<Duration>,
    cancellation: CancellationToken,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Number of enabled listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Ids of the enabled listeners, in registration order.
    pub fn listener_ids(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|r| r.listener.id())
    }

    /// Number of worker threads.
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// A handle that cancels runs of this analyzer.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Runs every listener over the parsed files and seals the report.
    ///
    /// Parse failures are recorded and never dispatched. Listener errors
    /// and panics are recorded and do not stop the run.
    pub fn analyze(&self, inputs: impl IntoIterator<Item = ParseOutcome>) -> Report {
        let detection = Detection::new();
        let mut files = Vec::new();
        for outcome in inputs {
            match outcome {
                Ok(file) => files.push(file),
                Err(failure) => {
                    warn!("Failed to parse {failure}");
                    record(detection.add_file_error(
                        failure.path,
                        AnalysisError::Parse {
                            line: failure.line,
                            column: failure.column,
                            message: failure.message,
                        },
                    ));
                }
            }
        }

        info!(
            "Analyzing {} files with {} listeners on {} threads",
            files.len(),
            self.listeners.len(),
            self.parallelism()
        );

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let scratch: Vec<Option<Vec<UserData>>> = self.pool.install(|| {
            files
                .par_iter()
                .map(|file| self.process_file(file, &detection, deadline))
                .collect()
        });

        let processed: Vec<(&SourceFile, Vec<UserData>)> = files
            .iter()
            .zip(scratch)
            .filter_map(|(file, data)| data.map(|data| (file, data)))
            .collect();

        for (index, registered) in self.listeners.iter().enumerate() {
            finish_listener(index, registered, &processed, &detection);
        }

        let report = match detection.seal() {
            Ok(report) => report,
            Err(e) => {
                warn!("Detection sealed twice: {e}");
                Report::default()
            }
        };

        info!(
            "Analysis complete: {} findings in {} files, {} files with errors",
            report.finding_count(),
            report.files_analyzed(),
            report.errors().len()
        );

        report
    }

    fn is_cancelled(&self, deadline: Option<Instant>) -> bool {
        self.cancellation.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Runs every listener's `on_process` for one file, in registration order.
    fn process_file(
        &self,
        file: &SourceFile,
        detection: &Detection,
        deadline: Option<Instant>,
    ) -> Option<Vec<UserData>> {
        if self.is_cancelled(deadline) {
            debug!("Skipping {} after cancellation", file.path().display());
            record(detection.add_file_error(file.path(), AnalysisError::Cancelled));
            return None;
        }

        debug!("Analyzing: {}", file.path().display());
        let mut scratch: Vec<UserData> = self.listeners.iter().map(|_| UserData::new()).collect();

        for (registered, data) in self.listeners.iter().zip(scratch.iter_mut()) {
            let id = registered.listener.id();
            let mut ctx = FileContext::new(file, data, &registered.config, detection);
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| registered.listener.on_process(&mut ctx)));

            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => AnalysisError::Listener {
                    listener: id.to_string(),
                    message: e.to_string(),
                },
                Err(payload) => AnalysisError::Panicked {
                    listener: id.to_string(),
                    message: panic_message(payload.as_ref()),
                },
            };
            warn!("{}: {error}", file.path().display());
            record(detection.add_file_error(file.path(), error));
        }

        record(detection.mark_analyzed());
        Some(scratch)
    }
}

/// Runs one listener's `on_finish` against every processed file.
fn finish_listener(
    index: usize,
    registered: &Registered,
    processed: &[(&SourceFile, Vec<UserData>)],
    detection: &Detection,
) {
    let id = registered.listener.id();
    let files = processed
        .iter()
        .filter_map(|(file, scratch)| {
            scratch
                .get(index)
                .map(|data| ProcessedFile { file: *file, data })
        })
        .collect();
    let mut ctx = FinishContext::new(files, &registered.config, detection);

    debug!("Finishing listener: {id}");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| registered.listener.on_finish(&mut ctx)));
    let message = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    warn!("Aggregation in {id} failed: {message}");
    record(detection.add_run_error(AnalysisError::Aggregation {
        listener: id.to_string(),
        message,
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn record(result: Result<(), ReportError>) {
    if let Err(e) = result {
        warn!("Dropped result: {e}");
    }
}
