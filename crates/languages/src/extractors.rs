//! Per-language strategy traits used by passes 2 and 4 (`SPEC_FULL.md` §4.6).

use codesearch_core::error::Result;
use codesearch_core::ids::{Location, SymbolName};
use codesearch_core::references::{PropertyChain, SelfKeyword, TypeInfo};
use tree_sitter::Node;

/// The two locations (plus an optional name) a scope-category capture
/// resolves to (§4.2).
///
/// `symbol_location` is the name token, belonging to the *enclosing*
/// scope. `scope_location` is the body the new scope spans. They are
/// returned together because deriving one so often requires navigating
/// past the other (e.g. a class's name field sits just before its body
/// field on the same declaration node).
#[derive(Debug, Clone)]
pub struct ScopeBoundary {
    pub symbol_location: Location,
    pub scope_location: Location,
    /// `None` for blocks, lambdas, and other anonymous forms (§3.3: "null
    /// for module root and for blocks").
    pub name: Option<SymbolName>,
}

/// Dispatches on a scope capture's node type to find where the new scope's
/// body starts/ends, honoring the critical boundary rule: the scope span
/// is the body, not the declaration (§4.2).
pub trait ScopeBoundaryExtractor: Send + Sync {
    /// `node` is the node carried by a `scope`-category capture. `source` is
    /// the full file text (needed to read the name token's text); `file_path`
    /// is threaded through so returned locations carry it.
    fn extract(&self, node: Node, source: &str, file_path: &str) -> Result<ScopeBoundary>;

    /// Python's indentation-delimited scopes require the builder to process
    /// containers before the scopes they contain (§4.2 sorting rule);
    /// brace languages rely on document order instead.
    fn requires_containment_sort(&self) -> bool {
        false
    }
}

/// The receiver/property-chain context extracted from a method call,
/// property access, or self-reference call node (§4.5.2).
#[derive(Debug, Clone, Default)]
pub struct ReceiverInfo {
    pub receiver_location: Option<Location>,
    pub property_chain: PropertyChain,
    pub is_self_reference: bool,
    pub self_keyword: Option<SelfKeyword>,
}

/// The source/target identifiers of an assignment (§4.5.2).
#[derive(Debug, Clone, Default)]
pub struct AssignmentParts {
    pub source: Option<Location>,
    pub target: Option<Location>,
}

/// Per-language metadata extraction operations called by the Reference
/// Builder (§4.5.2). Every method is independently optional at the call
/// site - the Reference Builder calls only the ones relevant to the
/// classified kind, and a `None` result just leaves the corresponding
/// optional field unset rather than failing the reference (§7: "Missing
/// metadata extractor" / "AST-level ambiguity" are both non-fatal).
pub trait MetadataExtractor: Send + Sync {
    fn extract_type_from_annotation(&self, _node: Node, _source: &str) -> Option<TypeInfo> {
        None
    }

    fn extract_receiver_info(&self, _node: Node, _source: &str, _file_path: &str) -> Option<ReceiverInfo> {
        None
    }

    fn extract_call_receiver(&self, _node: Node, _file_path: &str) -> Option<Location> {
        None
    }

    fn extract_property_chain(&self, _node: Node, _source: &str) -> Option<PropertyChain> {
        None
    }

    fn extract_assignment_parts(&self, _node: Node, _file_path: &str) -> AssignmentParts {
        AssignmentParts::default()
    }

    fn extract_construct_target(&self, _node: Node, _file_path: &str) -> Option<Location> {
        None
    }

    fn extract_type_arguments(&self, _node: Node, _source: &str) -> Option<Vec<String>> {
        None
    }

    fn extract_is_optional_chain(&self, _node: Node) -> bool {
        false
    }

    fn is_method_call(&self, _node: Node) -> bool {
        false
    }

    fn extract_call_name<'a>(&self, node: Node<'a>, source: &'a str) -> Option<&'a str> {
        node.utf8_text(source.as_bytes()).ok()
    }
}
