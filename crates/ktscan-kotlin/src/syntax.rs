//! Helpers over the Kotlin syntax tree.

use ktscan_core::SourceFile;
use tree_sitter::{Node, TreeCursor};

/// Node kinds of class-like declarations.
pub const CLASS_KINDS: &[&str] = &["class_declaration", "object_declaration"];

/// Node kind of function declarations.
pub const FUNCTION_KIND: &str = "function_declaration";

/// Node kinds that hold a declaration body rather than its header.
const BODY_KINDS: &[&str] = &["class_body", "enum_class_body", "function_body"];

/// Returns true for classes, interfaces and objects.
#[must_use]
pub fn is_class_like(node: Node<'_>) -> bool {
    CLASS_KINDS.contains(&node.kind())
}

/// Returns true for named declarations that contribute to signatures.
#[must_use]
pub fn is_declaration(node: Node<'_>) -> bool {
    is_class_like(node) || matches!(node.kind(), FUNCTION_KIND | "property_declaration")
}

/// Pre-order iterator over a node and all of its descendants.
pub struct Descendants<'tree> {
    cursor: TreeCursor<'tree>,
    done: bool,
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if self.cursor.goto_first_child() {
            return Some(node);
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}

/// Walks `node` and everything below it in document order.
#[must_use]
pub fn descendants(node: Node<'_>) -> Descendants<'_> {
    Descendants {
        cursor: node.walk(),
        done: false,
    }
}

/// Counts nodes of the given kinds below `node`, including `node` itself.
#[must_use]
pub fn count_kinds(node: Node<'_>, kinds: &[&str]) -> usize {
    descendants(node).filter(|n| kinds.contains(&n.kind())).count()
}

/// Joins the identifier children of a `qualified_identifier` with dots.
fn qualified_id(file: &SourceFile, node: Node<'_>) -> String {
    let mut cursor = node.walk();
    let parts: Vec<&str> = node
        .children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .map(|child| file.text(child))
        .collect();
    parts.join(".")
}

/// The file's package name, or `None` if it has no package header.
#[must_use]
pub fn package_name(file: &SourceFile) -> Option<String> {
    let root = file.root();
    let mut cursor = root.walk();
    let header = root
        .children(&mut cursor)
        .find(|n| n.kind() == "package_header")?;

    let mut cursor = header.walk();
    let name = header
        .children(&mut cursor)
        .find(|n| n.kind() == "qualified_identifier")
        .map(|id| qualified_id(file, id));
    name
}

/// Name of a declaration node.
#[must_use]
pub fn declaration_name<'f>(file: &'f SourceFile, node: Node<'_>) -> Option<&'f str> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(file.text(name));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" => return Some(file.text(child)),
            "variable_declaration" => {
                let mut inner = child.walk();
                let found = child
                    .children(&mut inner)
                    .find(|n| n.kind() == "identifier")
                    .map(|n| file.text(n));
                return found;
            }
            _ => {}
        }
    }
    None
}

/// Declaration text without its body, whitespace collapsed.
#[must_use]
pub fn header_text(file: &SourceFile, node: Node<'_>) -> String {
    let mut cursor = node.walk();
    let body_start = node
        .children(&mut cursor)
        .find(|child| BODY_KINDS.contains(&child.kind()))
        .map_or(node.end_byte(), |body| body.start_byte());
    let text = file
        .content()
        .get(node.start_byte()..body_start)
        .unwrap_or_default();
    collapse_whitespace(text)
}

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Enclosing declarations of `node`, outermost first, excluding `node`.
#[must_use]
pub fn enclosing_declarations(node: Node<'_>) -> Vec<Node<'_>> {
    let mut chain = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        if is_declaration(parent) {
            chain.push(parent);
        }
        current = parent.parent();
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KotlinParser;

    fn parse(src: &str) -> SourceFile {
        KotlinParser::new().parse("Test.kt", src).unwrap()
    }

    #[test]
    fn extracts_package() {
        let file = parse("package com.example.domain.model\n");
        assert_eq!(
            package_name(&file).as_deref(),
            Some("com.example.domain.model")
        );
    }

    #[test]
    fn missing_package_is_none() {
        assert_eq!(package_name(&parse("class A\n")), None);
        assert_eq!(package_name(&parse("")), None);
    }

    #[test]
    fn descendants_visit_every_node_once() {
        let file = parse("class A\nclass B\n");
        let root = file.root();
        let all: Vec<_> = descendants(root).collect();
        assert_eq!(all[0].kind(), "source_file");
        assert_eq!(all.iter().filter(|n| n.kind() == "class_declaration").count(), 2);
        assert_eq!(all.len(), count_recursive(root));
    }

    fn count_recursive(node: Node<'_>) -> usize {
        let mut cursor = node.walk();
        let below: usize = node.children(&mut cursor).map(count_recursive).sum();
        1 + below
    }

    #[test]
    fn counts_classes_and_objects() {
        let file = parse("package a\nclass User(val id: Long)\nobject Factory { }\ninterface Repo { }\n");
        assert_eq!(count_kinds(file.root(), CLASS_KINDS), 3);
    }

    #[test]
    fn counts_nested_functions() {
        let file = parse("class A {\n    fun a() {}\n    fun b() {}\n}\nfun c() {}\n");
        assert_eq!(count_kinds(file.root(), &[FUNCTION_KIND]), 3);
    }

    #[test]
    fn names_declarations() {
        let file = parse("class User(val id: Long)\n");
        let class = descendants(file.root())
            .find(|n| n.kind() == "class_declaration")
            .unwrap();
        assert_eq!(declaration_name(&file, class), Some("User"));
    }

    #[test]
    fn header_excludes_body() {
        let file = parse("class   Foo {\n    fun bar() { }\n}\n");
        let class = descendants(file.root())
            .find(|n| n.kind() == "class_declaration")
            .unwrap();
        assert_eq!(header_text(&file, class), "class Foo");
    }

    #[test]
    fn enclosing_chain_is_outermost_first() {
        let file = parse("class Outer {\n    class Inner {\n        fun f() {}\n    }\n}\n");
        let function = descendants(file.root())
            .find(|n| n.kind() == FUNCTION_KIND)
            .unwrap();
        let names: Vec<_> = enclosing_declarations(function)
            .into_iter()
            .filter_map(|n| declaration_name(&file, n))
            .collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(collapse_whitespace("  val   x =\n  (5) "), "val x = (5)");
    }
}
