//! Position model: where in a file something was found.

use crate::file::SourceFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// A line/column position (both 1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number in bytes (1-indexed).
    pub column: usize,
}

impl SourceLocation {
    /// Creates a new source position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A byte range in the file content, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl TextRange {
    /// Creates a new text range.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source code location of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path as given to the parser.
    pub file: PathBuf,
    /// Start position.
    pub start: SourceLocation,
    /// End position.
    pub end: SourceLocation,
    /// Byte range.
    pub text: TextRange,
}

impl Location {
    /// Creates a location with explicit values.
    #[must_use]
    pub fn new(
        file: impl Into<PathBuf>,
        start: SourceLocation,
        end: SourceLocation,
        text: TextRange,
    ) -> Self {
        Self {
            file: file.into(),
            start,
            end,
            text,
        }
    }

    /// Creates a location from the extent of a syntax tree node.
    #[must_use]
    pub fn from_node(file: &SourceFile, node: Node<'_>) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            file: file.path().to_path_buf(),
            start: SourceLocation::new(start.row + 1, start.column + 1),
            end: SourceLocation::new(end.row + 1, end.column + 1),
            text: TextRange::new(node.start_byte(), node.end_byte()),
        }
    }

    /// The file this location is in.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// `file:line:column` of the start position.
    #[must_use]
    pub fn compact(&self) -> String {
        format!("{}:{}", self.file.display(), self.start)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}
