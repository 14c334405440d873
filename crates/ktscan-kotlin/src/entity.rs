//! Entities for Kotlin syntax nodes.

use crate::syntax::{
    collapse_whitespace, declaration_name, enclosing_declarations, header_text, is_class_like,
    is_declaration,
};
use ktscan_core::{Entity, Location, SourceFile};
use tree_sitter::Node;

/// Builds the entity a finding on `node` is attached to.
///
/// The signature is the file name followed by the headers of the enclosing
/// declarations and of the node itself, joined with `$`. It depends only on
/// the text of the file, never on positions, so it is stable across runs
/// and survives edits elsewhere in the file.
#[must_use]
pub fn entity_of(file: &SourceFile, node: Node<'_>) -> Entity {
    let chain = enclosing_declarations(node);

    let mut segments = vec![file.file_name()];
    segments.extend(chain.iter().map(|n| signature_segment(file, *n)));
    segments.push(signature_segment(file, node));

    let class_name = chain
        .iter()
        .rev()
        .find(|n| is_class_like(**n))
        .and_then(|n| declaration_name(file, *n))
        .unwrap_or_default();

    let name = if is_declaration(node) {
        declaration_name(file, node).map_or_else(|| file.text(node).to_string(), str::to_string)
    } else {
        collapse_whitespace(file.text(node))
    };

    Entity::new(
        name,
        segments.join("$"),
        class_name,
        Location::from_node(file, node),
    )
}

fn signature_segment(file: &SourceFile, node: Node<'_>) -> String {
    if is_class_like(node) {
        declaration_name(file, node).map_or_else(|| header_text(file, node), str::to_string)
    } else if is_declaration(node) {
        header_text(file, node)
    } else {
        collapse_whitespace(file.text(node))
    }
}
