//! Parsed source files handed to listeners.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tree_sitter::{Node, Tree};

/// A successfully parsed source file.
///
/// Owns the source text and the syntax tree produced by the parser
/// collaborator. Listeners only ever see it through shared references.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    content: Arc<str>,
    tree: Tree,
}

impl SourceFile {
    /// Creates a source file from its path, content and parsed tree.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Arc<str>>, tree: Tree) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            tree,
        }
    }

    /// Path of the file as given to the parser.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, or the whole path if it has none.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.to_string_lossy().into_owned(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    /// Full source text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The syntax tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Root node of the syntax tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        self.content
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    /// Number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// A file the parser could not turn into a usable tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}:{line}:{column}: {message}", .path.display())]
pub struct ParseFailure {
    /// Path of the file that failed to parse.
    pub path: PathBuf,
    /// Line of the first syntax error (1-indexed, 0 if unknown).
    pub line: usize,
    /// Column of the first syntax error (1-indexed, 0 if unknown).
    pub column: usize,
    /// Parser message.
    pub message: String,
}

impl ParseFailure {
    /// Creates a parse failure without position information.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    /// Sets the position of the first syntax error.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

/// What the parser collaborator hands to the analyzer for each file.
pub type ParseOutcome = Result<SourceFile, ParseFailure>;
