//! Strict Kotlin parsing.

use ktscan_core::{ParseFailure, ParseOutcome, SourceFile};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

/// File extensions handled by [`KotlinParser`].
pub const KOTLIN_EXTENSIONS: &[&str] = &["kt", "kts"];

/// Parses Kotlin source into [`SourceFile`]s.
///
/// A tree that contains error or missing nodes is rejected, so listeners
/// only ever see syntactically valid files.
#[derive(Clone)]
pub struct KotlinParser {
    language: Language,
}

impl KotlinParser {
    /// Creates a new Kotlin parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_kotlin_ng::LANGUAGE.into(),
        }
    }

    /// Returns true if the path has a Kotlin extension.
    #[must_use]
    pub fn handles(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| KOTLIN_EXTENSIONS.contains(&e))
    }

    /// Parses `source` as the content of `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] positioned at the first syntax error.
    pub fn parse(&self, path: impl AsRef<Path>, source: impl Into<String>) -> ParseOutcome {
        let path = path.as_ref();
        let source = source.into();

        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseFailure::new(path, format!("failed to load Kotlin grammar: {e}")))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ParseFailure::new(path, "parser produced no tree"))?;

        if let Some(node) = first_error(tree.root_node()) {
            let position = node.start_position();
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "unexpected syntax".to_string()
            };
            return Err(ParseFailure::new(path, message).at(position.row + 1, position.column + 1));
        }

        Ok(SourceFile::new(path, source, tree))
    }

    /// Reads and parses a file.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] if the file cannot be read or parsed.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> ParseOutcome {
        let path = path.as_ref();
        debug!("Parsing: {}", path.display());
        let source = std::fs::read_to_string(path)
            .map_err(|e| ParseFailure::new(path, format!("failed to read file: {e}")))?;
        self.parse(path, source)
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Descends along erroneous children to the first error or missing node.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    let mut cursor = root.walk();
    let mut node = root;
    loop {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        match node.children(&mut cursor).find(Node::has_error) {
            Some(child) => node = child,
            None => return Some(node),
        }
    }
}
