//! Small helpers over `tree_sitter::Node`, shared by every language module.
//!
//! Mirrors the `common` helpers the teacher repository keeps free-standing
//! (`find_capture_node`, `node_to_text`, `require_capture_node`) rather than
//! wrapping `Node` in a newtype - the pipeline borrows tree-sitter's own
//! node type directly (§6's collaborator contract maps onto it exactly).

use codesearch_core::error::{Error, Result};
use codesearch_core::ids::Position;
use tree_sitter::Node;

/// Extracts a node's source text, falling back to an empty string on
/// invalid UTF-8 rather than failing the whole pipeline over a single
/// malformed token.
pub fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Converts a node's span into a `Location`, using the uniform 1-based
/// inclusive-start/exclusive-end convention (§3.1).
pub fn node_location(node: Node, file_path: &str) -> codesearch_core::Location {
    let start = node.start_position();
    let end = node.end_position();
    codesearch_core::Location::new(
        file_path.to_string(),
        Position::from_zero_based(start.row, start.column),
        Position::from_zero_based(end.row, end.column),
    )
}

/// Requires a named field, producing the §7 "required AST field missing"
/// error when it is absent.
pub fn require_field<'a>(node: Node<'a>, field: &str) -> Result<Node<'a>> {
    node.child_by_field_name(field)
        .ok_or_else(|| Error::missing_field(node.kind(), field))
}

/// Requires a node's parent, for captures bound to a `name:`-field node
/// (e.g. `@definition.function` on `name: (identifier)`) that need to reach
/// back to the declaration node holding every other field.
pub fn require_parent<'a>(node: Node<'a>) -> Result<Node<'a>> {
    node.parent().ok_or_else(|| Error::missing_field(node.kind(), "parent"))
}

/// Walks a node's direct children looking for one of the given kinds.
pub fn first_child_of_kind<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| kinds.contains(&c.kind()))
}

/// `true` if any direct child has exactly this kind (e.g. the `async`
/// keyword token preceding a function declaration).
pub fn has_child_of_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

/// Walks up from `node` through `parent()` until `predicate` matches or the
/// root is reached, returning the first matching ancestor.
pub fn find_ancestor<'a>(node: Node<'a>, predicate: impl Fn(Node<'a>) -> bool) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if predicate(n) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).expect("set language");
        parser.parse(source, None).expect("parse")
    }

    #[test]
    fn node_text_returns_source_slice() {
        let source = "const x = 1;";
        let tree = parse(source);
        let root = tree.root_node();
        assert_eq!(node_text(root, source).trim_end(), source);
    }

    #[test]
    fn require_field_errors_on_missing() {
        let source = "const x = 1;";
        let tree = parse(source);
        let root = tree.root_node();
        assert!(require_field(root, "nonexistent_field").is_err());
    }
}
