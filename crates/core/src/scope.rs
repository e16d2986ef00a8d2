//! Lexical scope tree (`SPEC_FULL.md` §3.3).

use crate::ids::{Location, ScopeId, SymbolName};
use serde::{Deserialize, Serialize};

/// The kind of lexical region a `LexicalScope` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Module,
    Class,
    Function,
    Method,
    Constructor,
    Block,
}

impl ScopeType {
    /// Maps a scope capture's entity to a `ScopeType` (§4.2).
    ///
    /// Unknown entities under category `scope` default to `Block` rather
    /// than erroring - the scope builder still needs a span for them even
    /// if no language declares them explicitly.
    pub fn from_capture_entity(entity: &str) -> Self {
        match entity {
            "module" | "namespace" => Self::Module,
            "class" | "interface" | "enum" => Self::Class,
            "function" | "closure" => Self::Function,
            "method" => Self::Method,
            "constructor" => Self::Constructor,
            "block" => Self::Block,
            _ => Self::Block,
        }
    }
}

/// A lexically-bounded region of the file.
///
/// `location` is the scope's *body*, never the declaration - see the
/// critical boundary rule in §4.2. `child_ids` is ordered by source
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalScope {
    pub id: ScopeId,
    pub parent_id: Option<ScopeId>,
    pub name: Option<SymbolName>,
    pub scope_type: ScopeType,
    pub location: Location,
    pub child_ids: Vec<ScopeId>,
}

impl LexicalScope {
    pub fn new_root(location: Location) -> Self {
        Self {
            id: ScopeId::new("module", &location),
            parent_id: None,
            name: None,
            scope_type: ScopeType::Module,
            location,
            child_ids: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
