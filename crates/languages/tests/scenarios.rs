//! Fixture-style tests for the literal scenarios in `spec.md` §8 (S1-S7),
//! exercised end to end through `build_semantic_index` rather than against
//! an individual pass in isolation.

use codesearch_core::definitions::Definition;
use codesearch_core::error::Result;
use codesearch_core::references::{ReferenceKind, SelfKeyword, SymbolReference};
use codesearch_core::{IndexerConfig, Language, SemanticIndex};
use codesearch_languages::{build_semantic_index, ParsedFile};
use pretty_assertions::assert_eq;
use std::path::Path;
use tree_sitter::Tree;

fn parse(source: &str, language: Language) -> Tree {
    let ts_language: tree_sitter::Language = match language {
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
    };
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&ts_language).expect("set language");
    parser.parse(source, None).expect("parse")
}

fn index(source: &str, language: Language) -> Result<SemanticIndex> {
    let tree = parse(source, language);
    let path = Path::new("fixture");
    let file_lines = source.lines().count().max(1);
    let file_end_column = source.lines().last().map(|l| l.len() + 1).unwrap_or(1);
    let parsed_file = ParsedFile {
        file_path: path,
        file_lines,
        file_end_column,
        source,
    };
    build_semantic_index(&parsed_file, &tree, language, &IndexerConfig::default())
}

/// S1 - class with a method (TypeScript).
#[test]
fn s1_class_with_method() {
    let source = "class MyClass {\n  method() {}\n}";
    let idx = index(source, Language::TypeScript).expect("index");

    let class = idx
        .classes
        .values()
        .find(|c| c.name() == "MyClass")
        .expect("MyClass definition");
    assert_eq!(class.defining_scope_id(), idx.root_scope_id.as_ref().expect("root"));
    assert_eq!(class.methods.len(), 1);
    assert_eq!(class.methods[0].name, "method");

    let class_scopes: Vec<_> = idx
        .scopes
        .values()
        .filter(|s| s.scope_type == codesearch_core::ScopeType::Class)
        .collect();
    assert_eq!(class_scopes.len(), 1);
    let class_scope = class_scopes[0];
    assert_eq!(class_scope.parent_id.as_ref(), idx.root_scope_id.as_ref());

    // The class's own name token lies outside the scope it introduces
    // (§4.2's critical boundary rule): the scope body starts strictly
    // after the name's location ends.
    assert!(class_scope.location.start > class.common.location.end);
}

/// S2 - nested class inside a Python method.
#[test]
fn s2_python_nested_class() {
    let source = "class Outer:\n    def method(self):\n        class Inner:\n            def inner_method(self):\n                pass\n";
    let idx = index(source, Language::Python).expect("index");

    let outer = idx.classes.values().find(|c| c.name() == "Outer").expect("Outer");
    assert_eq!(outer.defining_scope_id(), idx.root_scope_id.as_ref().expect("root"));

    let inner = idx.classes.values().find(|c| c.name() == "Inner").expect("Inner");
    let method = outer
        .methods
        .iter()
        .find(|m| m.name == "method")
        .expect("Outer.method");
    assert_eq!(inner.defining_scope_id(), &method.defining_scope_id);
}

/// S3 - exported object literal: the outer const is exported, the binding
/// captured inside its arrow-function initializer is not (§4.4.2).
#[test]
fn s3_exported_object_literal() {
    let source = "export const CONFIG = {\n  handler: () => {\n    const local_var = 42;\n    return local_var;\n  }\n};";
    let idx = index(source, Language::TypeScript).expect("index");

    let config = idx
        .variables
        .values()
        .find(|v| v.name() == "CONFIG")
        .expect("CONFIG definition");
    assert!(config.common.is_exported);

    let local_var = idx
        .variables
        .values()
        .find(|v| v.name() == "local_var")
        .expect("local_var definition");
    assert!(!local_var.common.is_exported);
}

/// S4 - chained method call produces one `method_call` reference with the
/// full receiver-to-name property chain.
#[test]
fn s4_chained_method_call() {
    let source = "api.users.list();";
    let idx = index(source, Language::JavaScript).expect("index");

    let calls: Vec<_> = idx
        .references
        .iter()
        .filter(|r| r.kind() == ReferenceKind::MethodCall)
        .collect();
    assert_eq!(calls.len(), 1);

    match calls[0] {
        SymbolReference::MethodCall {
            common,
            property_chain,
            receiver_location,
            ..
        } => {
            assert_eq!(common.name, "list");
            assert_eq!(
                property_chain,
                &vec!["api".to_string(), "users".to_string(), "list".to_string()]
            );
            assert!(receiver_location.is_some());
        }
        other => panic!("expected method_call, got {other:?}"),
    }
}

/// S6 - a `super.foo()` call becomes a `self_reference_call` tagged
/// `self_keyword = "super"` with `property_chain = ["super", "foo"]`.
#[test]
fn s6_super_call() {
    let source = "class Base {\n  foo() {}\n}\nclass Child extends Base {\n  foo() {\n    super.foo();\n  }\n}";
    let idx = index(source, Language::JavaScript).expect("index");

    let super_calls: Vec<_> = idx
        .references
        .iter()
        .filter(|r| r.kind() == ReferenceKind::SelfReferenceCall)
        .collect();
    assert_eq!(super_calls.len(), 1);

    match super_calls[0] {
        SymbolReference::SelfReferenceCall {
            self_keyword,
            property_chain,
            ..
        } => {
            assert_eq!(*self_keyword, SelfKeyword::Super);
            assert_eq!(property_chain, &vec!["super".to_string(), "foo".to_string()]);
        }
        other => panic!("expected self_reference_call, got {other:?}"),
    }
}

/// S7 - a variable whose initializer calls a method on a bare identifier
/// records that identifier as `derived_from`.
#[test]
fn s7_derived_variable() {
    let source = "const CONFIG = new Map([]); const handler = CONFIG.get('k');";
    let idx = index(source, Language::JavaScript).expect("index");

    let handler = idx
        .variables
        .values()
        .find(|v| v.name() == "handler")
        .expect("handler definition");
    assert_eq!(handler.derived_from.as_deref(), Some("CONFIG"));
}

/// Invariant 1 (§8): every non-root scope is spatially contained in its
/// parent and listed in the parent's `child_ids`.
#[test]
fn scope_tree_containment_holds() {
    let source = "function outer() {\n  function inner() {\n    return 1;\n  }\n  return inner();\n}";
    let idx = index(source, Language::JavaScript).expect("index");

    for scope in idx.scopes.values() {
        if let Some(parent_id) = &scope.parent_id {
            let parent = idx.scopes.get(parent_id).expect("parent scope present");
            assert!(parent.location.contains(&scope.location));
            assert!(parent.child_ids.contains(&scope.id));
        }
    }
}

/// Invariant 2 (§8): every definition's `defining_scope_id` matches the
/// scope that actually contains its location.
#[test]
fn definitions_match_their_containing_scope() {
    let source = "function foo() {\n  function bar() {\n    return 1;\n  }\n}";
    let idx = index(source, Language::JavaScript).expect("index");

    let bar = idx.functions.values().find(|f| f.name() == "bar").expect("bar");
    let foo = idx.functions.values().find(|f| f.name() == "foo").expect("foo");
    let foo_scope = idx
        .scopes
        .values()
        .find(|s| s.name.as_deref() == Some("foo"))
        .map(|s| &s.id);
    assert_eq!(Some(bar.defining_scope_id()), foo_scope);
    assert_eq!(foo.defining_scope_id(), idx.root_scope_id.as_ref().expect("root"));
}

/// §4.4.4 - a JSDoc comment directly preceding a function attaches as its
/// docstring; an unrelated comment higher up does not get swept in.
#[test]
fn jsdoc_comment_attaches_to_following_function() {
    let source = "// unrelated\n\n/**\n * Adds two numbers.\n */\nfunction add(a, b) {\n  return a + b;\n}";
    let idx = index(source, Language::JavaScript).expect("index");

    let add = idx.functions.values().find(|f| f.name() == "add").expect("add");
    let doc = add.docstring.as_deref().expect("docstring attached");
    assert!(doc.contains("Adds two numbers."));
    assert!(!doc.contains("unrelated"));
}

/// §4.4.4 - a method's JSDoc comment attaches the same way as a function's.
#[test]
fn jsdoc_comment_attaches_to_following_method() {
    let source = "class Calculator {\n  /** Adds two numbers. */\n  add(a, b) {\n    return a + b;\n  }\n}";
    let idx = index(source, Language::JavaScript).expect("index");

    let calculator = idx.classes.values().find(|c| c.name() == "Calculator").expect("Calculator");
    let add = calculator.methods.iter().find(|m| m.name == "add").expect("add method");
    assert_eq!(add.docstring.as_deref(), Some("/** Adds two numbers. */"));
}

/// §4.4.4 - a Rust `///` doc comment block attaches to the following
/// function, with contiguous lines merged into one string.
#[test]
fn rust_doc_comment_attaches_to_following_function() {
    let source = "/// Adds two numbers.\n/// Returns their sum.\nfn add(a: i32, b: i32) -> i32 {\n    a + b\n}";
    let idx = index(source, Language::Rust).expect("index");

    let add = idx.functions.values().find(|f| f.name() == "add").expect("add");
    let doc = add.docstring.as_deref().expect("docstring attached");
    assert!(doc.contains("Adds two numbers."));
    assert!(doc.contains("Returns their sum."));
}

/// §4.4.4 - a plain `//` comment (not `///`) is not treated as Rust
/// documentation.
#[test]
fn rust_plain_comment_is_not_a_docstring() {
    let source = "// just a note\nfn add(a: i32, b: i32) -> i32 {\n    a + b\n}";
    let idx = index(source, Language::Rust).expect("index");

    let add = idx.functions.values().find(|f| f.name() == "add").expect("add");
    assert_eq!(add.docstring, None);
}

/// §4.4.5 - a JavaScript class field with no type annotation of its own
/// mines its type from a preceding JSDoc `@type {T}` comment.
#[test]
fn jsdoc_type_tag_mined_for_untyped_js_field() {
    let source = "class Point {\n  /** @type {number} */\n  x;\n}";
    let idx = index(source, Language::JavaScript).expect("index");

    let point = idx.classes.values().find(|c| c.name() == "Point").expect("Point");
    let x = point.properties.iter().find(|p| p.name == "x").expect("x field");
    assert_eq!(x.type_annotation.as_deref(), Some("number"));
}

/// §4.4.5 - a JavaScript function's JSDoc `@returns {T}` fills in the return
/// type JS has no annotation syntax for.
#[test]
fn jsdoc_returns_tag_mined_for_js_function() {
    let source = "/**\n * @returns {number}\n */\nfunction square(n) {\n  return n * n;\n}";
    let idx = index(source, Language::JavaScript).expect("index");

    let square = idx.functions.values().find(|f| f.name() == "square").expect("square");
    assert_eq!(square.signature.return_type.as_deref(), Some("number"));
}
