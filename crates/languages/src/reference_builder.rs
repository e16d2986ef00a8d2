//! Pass 4: the Reference Builder (`SPEC_FULL.md` §4.5).
//!
//! Classifies each reference/assignment/return capture into a
//! [`ReferenceKind`] using the ordered rule list in §4.5.1, then calls
//! whichever [`MetadataExtractor`] operations that kind needs to compose the
//! matching tagged [`SymbolReference`] variant. A missing extractor method
//! (default trait impl) or an AST shape the extractor can't handle never
//! fails the pass - the optional field is simply left unset (§7).

use crate::context::ProcessingContext;
use crate::extractors::MetadataExtractor;
use codesearch_core::capture::{Category, CaptureName};
use codesearch_core::error::Result;
use codesearch_core::references::{
    PropertyChain, ReferenceCommon, ReferenceKind, SelfKeyword, SymbolReference, TypeCertainty,
    TypeInfo, TypeReferenceContext,
};
use tree_sitter::Node;

/// Runs pass 4 over every reference/assignment/return capture in document
/// order. `source` is the full file text - captures only borrow their own
/// span, but every `MetadataExtractor` method navigates sibling/ancestor
/// nodes whose byte offsets are relative to the whole file.
pub fn run(ctx: &ProcessingContext, metadata: &dyn MetadataExtractor, source: &str, file_path: &str) -> Result<Vec<SymbolReference>> {
    let mut references = Vec::new();
    for capture in ctx.captures.iter() {
        if !matches!(
            capture.category(),
            Category::Reference | Category::Assignment | Category::Return | Category::Type
        ) {
            continue;
        }
        let scope_id = ctx.get_scope_id(&capture.location)?;
        let name = metadata
            .extract_call_name(capture.node, source)
            .map(str::to_string)
            .unwrap_or_else(|| capture.text.to_string());
        let common = ReferenceCommon {
            name,
            location: capture.location.clone(),
            scope_id,
        };
        let kind = classify(&capture.name, capture.node, metadata);
        references.push(build_reference(kind, common, capture.node, source, capture.text, file_path, metadata));
    }
    Ok(references)
}

/// The ordered classification rules of §4.5.1; first match wins.
fn classify(name: &CaptureName, node: Node, metadata: &dyn MetadataExtractor) -> ReferenceKind {
    if name.category == Category::Assignment {
        return ReferenceKind::Assignment;
    }
    if name.category == Category::Return {
        return ReferenceKind::Return;
    }
    if name.entity == "call" && name.contains("constructor") {
        return ReferenceKind::ConstructorCall;
    }
    if name.entity == "call" && name.contains("method") {
        return ReferenceKind::MethodCall;
    }
    if name.entity == "call" && metadata.is_method_call(node) {
        return ReferenceKind::MethodCall;
    }
    if name.entity == "call" {
        return ReferenceKind::FunctionCall;
    }
    if name.entity == "super" {
        return ReferenceKind::SelfReferenceCall;
    }
    if name.entity == "constructor" {
        return ReferenceKind::ConstructorCall;
    }
    if name.entity == "method" {
        return ReferenceKind::MethodCall;
    }
    if matches!(name.entity.as_str(), "property" | "field" | "member_access") {
        return ReferenceKind::PropertyAccess;
    }
    if name.entity == "write" {
        return ReferenceKind::Write;
    }
    if matches!(name.entity.as_str(), "type" | "type_alias" | "class" | "interface" | "enum") {
        return ReferenceKind::TypeReference;
    }
    ReferenceKind::Read
}

fn fallback_type_info(text: &str) -> TypeInfo {
    TypeInfo {
        type_name: text.to_string(),
        certainty: TypeCertainty::Ambiguous,
        is_nullable: false,
        type_arguments: None,
    }
}

fn type_reference_context(text: &str) -> TypeReferenceContext {
    if text.contains("implements") {
        TypeReferenceContext::Implements
    } else if text.contains("extends") {
        TypeReferenceContext::Extends
    } else {
        TypeReferenceContext::Annotation
    }
}

struct ReceiverParts {
    receiver_location: Option<codesearch_core::ids::Location>,
    property_chain: PropertyChain,
    is_optional_chain: bool,
    is_self_reference: bool,
    self_keyword: Option<SelfKeyword>,
}

fn receiver_parts(node: Node, source: &str, file_path: &str, metadata: &dyn MetadataExtractor) -> ReceiverParts {
    if let Some(info) = metadata.extract_receiver_info(node, source, file_path) {
        return ReceiverParts {
            receiver_location: info.receiver_location,
            property_chain: info.property_chain,
            is_optional_chain: metadata.extract_is_optional_chain(node),
            is_self_reference: info.is_self_reference,
            self_keyword: info.self_keyword,
        };
    }
    ReceiverParts {
        receiver_location: metadata.extract_call_receiver(node, file_path),
        property_chain: metadata.extract_property_chain(node, source).unwrap_or_default(),
        is_optional_chain: metadata.extract_is_optional_chain(node),
        is_self_reference: false,
        self_keyword: None,
    }
}

fn build_reference(
    kind: ReferenceKind,
    common: ReferenceCommon,
    node: Node,
    source: &str,
    capture_text: &str,
    file_path: &str,
    metadata: &dyn MetadataExtractor,
) -> SymbolReference {
    match kind {
        ReferenceKind::Read => SymbolReference::Read { common },
        ReferenceKind::Write => SymbolReference::Write { common },
        ReferenceKind::FunctionCall => SymbolReference::FunctionCall { common },
        ReferenceKind::MethodCall => {
            let parts = receiver_parts(node, source, file_path, metadata);
            if parts.is_self_reference {
                let mut property_chain = parts.property_chain;
                if property_chain.is_empty() {
                    property_chain.push(common.name.clone());
                }
                return SymbolReference::SelfReferenceCall {
                    common,
                    self_keyword: parts.self_keyword.unwrap_or(SelfKeyword::This),
                    property_chain,
                };
            }
            SymbolReference::MethodCall {
                common,
                receiver_location: parts.receiver_location,
                property_chain: parts.property_chain,
                is_optional_chain: parts.is_optional_chain,
            }
        }
        ReferenceKind::SelfReferenceCall => {
            // Rule 7 (§4.5.1): `entity == "super"` always becomes a
            // self-reference call with `self_keyword = "super"` and
            // `property_chain = ["super", name]` regardless of what the
            // extractor reports.
            SymbolReference::SelfReferenceCall {
                property_chain: vec!["super".to_string(), common.name.clone()],
                common,
                self_keyword: SelfKeyword::Super,
            }
        }
        ReferenceKind::ConstructorCall => SymbolReference::ConstructorCall {
            construct_target: metadata.extract_construct_target(node, file_path),
            common,
        },
        ReferenceKind::PropertyAccess => {
            let parts = receiver_parts(node, source, file_path, metadata);
            SymbolReference::PropertyAccess {
                common,
                receiver_location: parts.receiver_location,
                property_chain: parts.property_chain,
                is_optional_chain: parts.is_optional_chain,
            }
        }
        ReferenceKind::TypeReference => {
            let type_info = metadata
                .extract_type_from_annotation(node, source)
                .unwrap_or_else(|| fallback_type_info(capture_text));
            let context = type_reference_context(capture_text);
            SymbolReference::TypeReference { common, type_info, context }
        }
        ReferenceKind::Assignment => SymbolReference::Assignment {
            target_location: metadata.extract_assignment_parts(node, file_path).target,
            common,
        },
        ReferenceKind::Return => SymbolReference::Return {
            return_type: metadata.extract_type_from_annotation(node, source).map(|t| t.type_name),
            common,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::capture::CaptureName;

    fn parse(source: &str) -> tree_sitter::Tree {
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).expect("set language");
        parser.parse(source, None).expect("parse")
    }

    struct NoopExtractor;
    impl MetadataExtractor for NoopExtractor {}

    #[test]
    fn super_entity_always_classifies_as_self_reference_call() {
        let tree = parse("super.foo();");
        let root = tree.root_node();
        let name = CaptureName::parse("reference.super").expect("parse capture name");
        let kind = classify(&name, root, &NoopExtractor);
        assert_eq!(kind, ReferenceKind::SelfReferenceCall);
    }

    #[test]
    fn constructor_named_call_classifies_before_generic_call_rule() {
        let tree = parse("new Foo();");
        let root = tree.root_node();
        let name = CaptureName::parse("reference.call.constructor").expect("parse capture name");
        let kind = classify(&name, root, &NoopExtractor);
        assert_eq!(kind, ReferenceKind::ConstructorCall);
    }

    #[test]
    fn assignment_category_wins_regardless_of_entity() {
        let tree = parse("x = 1;");
        let root = tree.root_node();
        let name = CaptureName::parse("assignment.call").expect("parse capture name");
        let kind = classify(&name, root, &NoopExtractor);
        assert_eq!(kind, ReferenceKind::Assignment);
    }

    #[test]
    fn super_call_builds_expected_property_chain() {
        let tree = parse("super.foo();");
        let root = tree.root_node();
        let common = ReferenceCommon {
            name: "foo".to_string(),
            location: codesearch_core::ids::Location::new(
                "f.js",
                codesearch_core::ids::Position::new(1, 1),
                codesearch_core::ids::Position::new(1, 1),
            ),
            scope_id: codesearch_core::ids::ScopeId::new(
                "module",
                &codesearch_core::ids::Location::new(
                    "f.js",
                    codesearch_core::ids::Position::new(1, 1),
                    codesearch_core::ids::Position::new(1, 1),
                ),
            ),
        };
        let reference = build_reference(
            ReferenceKind::SelfReferenceCall,
            common,
            root,
            "super.foo();",
            "super.foo();",
            "f.js",
            &NoopExtractor,
        );
        if let SymbolReference::SelfReferenceCall { self_keyword, property_chain, .. } = reference {
            assert_eq!(self_keyword, SelfKeyword::Super);
            assert_eq!(property_chain, vec!["super".to_string(), "foo".to_string()]);
        } else {
            panic!("expected SelfReferenceCall");
        }
    }
}
