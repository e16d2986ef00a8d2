//! Pass 1: the Query Runner (`SPEC_FULL.md` §4.1).
//!
//! Executes the language's query against the syntax tree and yields
//! captures in document order, normalizing each capture's name into a
//! `(category, entity)` pair and dropping any capture whose name starts
//! with `_` (it exists only for the query's internal predicates, §3.2).

use crate::capture::Capture;
use crate::node_ext::node_location;
use codesearch_core::capture::CaptureName;
use codesearch_core::error::{Error, Result};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor, Tree};

/// Runs `query_source` against `tree`, returning captures in document order.
pub fn run<'a>(
    tree: &'a Tree,
    source: &'a str,
    query_source: &str,
    file_path: &str,
) -> Result<Vec<Capture<'a>>> {
    let language = tree.language();
    let query = Query::new(&language, query_source)
        .map_err(|e| Error::invalid_input(format!("failed to compile query: {e}")))?;

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

    let mut captures = Vec::new();
    while let Some(query_match) = matches.next() {
        for qc in query_match.captures {
            let raw_name = query.capture_names()[qc.index as usize];
            if raw_name.starts_with('_') {
                continue;
            }
            let name = CaptureName::parse(raw_name)?;
            let node = qc.node;
            let text = node.utf8_text(source.as_bytes()).unwrap_or("");
            let location = node_location(node, file_path);
            captures.push(Capture {
                name,
                node,
                text,
                location,
            });
        }
    }

    // Tree-sitter's cursor yields captures match-by-match, not strictly by
    // document position across different patterns; sort by start position
    // to guarantee the document-order contract the rest of the pipeline
    // relies on (scope builder sorting for brace languages, §4.2).
    captures.sort_by_key(|c| (c.node.start_byte(), c.node.end_byte()));

    Ok(captures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Tree {
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).expect("set language");
        parser.parse(source, None).expect("parse")
    }

    #[test]
    fn filters_underscore_prefixed_captures() {
        let source = "function foo() {}";
        let tree = parse(source);
        let query = r#"
            (function_declaration
              name: (identifier) @definition.function
              body: (statement_block) @_body)
        "#;
        let captures = run(&tree, source, query, "f.js").expect("run");
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].name.raw, "definition.function");
    }

    #[test]
    fn rejects_unknown_category() {
        let source = "function foo() {}";
        let tree = parse(source);
        let query = r#"(function_declaration name: (identifier) @bogus.function)"#;
        let err = run(&tree, source, query, "f.js").unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn captures_are_sorted_by_document_position() {
        let source = "function a() {}\nfunction b() {}";
        let tree = parse(source);
        let query = r#"(function_declaration name: (identifier) @definition.function)"#;
        let captures = run(&tree, source, query, "f.js").expect("run");
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0].text, "a");
        assert_eq!(captures[1].text, "b");
    }
}
