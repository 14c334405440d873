//! Processors summing simple per-file counts into project metrics.

use ktscan_core::{FileContext, FinishContext, Key, Listener, ListenerError, ProjectMetric, SourceFile};
use ktscan_kotlin::syntax::{count_kinds, CLASS_KINDS, FUNCTION_KIND};

/// Scratch key and metric type for the class count.
pub const NUMBER_OF_CLASSES: Key<usize> = Key::new("number of classes");

/// Scratch key and metric type for the function count.
pub const NUMBER_OF_FUNCTIONS: Key<usize> = Key::new("number of functions");

/// Scratch key and metric type for the lines-of-code count.
pub const LINES_OF_CODE: Key<usize> = Key::new("lines of code");

/// Stores a count per file and reports the sum as a project metric.
#[derive(Debug, Clone, Copy)]
pub struct CountProcessor {
    id: &'static str,
    key: Key<usize>,
    count: fn(&SourceFile) -> usize,
}

impl CountProcessor {
    /// Counts classes, interfaces and objects.
    #[must_use]
    pub fn classes() -> Self {
        Self {
            id: "ClassCountProcessor",
            key: NUMBER_OF_CLASSES,
            count: |file| count_kinds(file.root(), CLASS_KINDS),
        }
    }

    /// Counts function declarations, including local and member functions.
    #[must_use]
    pub fn functions() -> Self {
        Self {
            id: "FunctionCountProcessor",
            key: NUMBER_OF_FUNCTIONS,
            count: |file| count_kinds(file.root(), &[FUNCTION_KIND]),
        }
    }

    /// Counts lines that are neither blank nor comment-only.
    #[must_use]
    pub fn lines_of_code() -> Self {
        Self {
            id: "LinesOfCodeProcessor",
            key: LINES_OF_CODE,
            count: |file| lines_of_code(file.content()),
        }
    }
}

impl Listener for CountProcessor {
    fn id(&self) -> &str {
        self.id
    }

    fn on_process(&self, ctx: &mut FileContext<'_>) -> Result<(), ListenerError> {
        let count = (self.count)(ctx.file());
        ctx.put(&self.key, count);
        Ok(())
    }

    fn on_finish(&self, ctx: &mut FinishContext<'_>) -> Result<(), ListenerError> {
        let total: usize = ctx.values(&self.key).sum();
        ctx.add_project_metric(ProjectMetric::from_count(self.key.name(), total))
    }
}

fn lines_of_code(content: &str) -> usize {
    let mut in_block = false;
    let mut count = 0;
    for line in content.lines().map(str::trim) {
        if in_block {
            if let Some(end) = line.find("*/") {
                in_block = false;
                if !line[end + 2..].trim().is_empty() {
                    count += 1;
                }
            }
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            match line.find("*/") {
                Some(end) if !line[end + 2..].trim().is_empty() => count += 1,
                Some(_) => {}
                None => in_block = true,
            }
            continue;
        }
        count += 1;
    }
    count
}
