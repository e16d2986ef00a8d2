//! Reference records produced by pass 4, the `ReferenceBuilder` (`SPEC_FULL.md` §3.5, §4.5).

use crate::ids::{Location, ScopeId, SymbolName};
use serde::{Deserialize, Serialize};

/// The classified kind of a reference, decided by `ReferenceBuilder::classify` (§4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Read,
    Write,
    FunctionCall,
    MethodCall,
    SelfReferenceCall,
    ConstructorCall,
    PropertyAccess,
    TypeReference,
    Assignment,
    Return,
}

/// A keyword denoting the current instance or its base class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfKeyword {
    This,
    SelfLower,
    Super,
}

/// How certain a type reference is, per the extractor that produced it (§3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCertainty {
    /// Lifted from an explicit type annotation.
    Declared,
    /// Guessed from the shape of an initializer (e.g. a literal).
    Inferred,
    /// Neither of the above could be established confidently.
    Ambiguous,
}

/// Where a `TypeReference` was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeReferenceContext {
    Annotation,
    Extends,
    Implements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub type_name: String,
    pub certainty: TypeCertainty,
    pub is_nullable: bool,
    pub type_arguments: Option<Vec<String>>,
}

/// A property chain: the ordered identifiers/index literals along a
/// member-expression chain, ending with the name of the access or call.
/// `a.b[0].c()` -> `["a", "b", "0", "c"]` (§4.5.2).
pub type PropertyChain = Vec<SymbolName>;

/// Fields shared by every reference variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCommon {
    pub name: SymbolName,
    pub location: Location,
    pub scope_id: ScopeId,
}

/// A tagged reference, one variant per `ReferenceKind` (§3.5).
///
/// Each variant carries only the fields relevant to it - optionality is
/// per-variant, never a single record with every field `Option` (§9,
/// "Tagged references").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolReference {
    Read {
        #[serde(flatten)]
        common: ReferenceCommon,
    },
    Write {
        #[serde(flatten)]
        common: ReferenceCommon,
    },
    FunctionCall {
        #[serde(flatten)]
        common: ReferenceCommon,
    },
    MethodCall {
        #[serde(flatten)]
        common: ReferenceCommon,
        receiver_location: Option<Location>,
        property_chain: PropertyChain,
        is_optional_chain: bool,
    },
    SelfReferenceCall {
        #[serde(flatten)]
        common: ReferenceCommon,
        self_keyword: SelfKeyword,
        property_chain: PropertyChain,
    },
    ConstructorCall {
        #[serde(flatten)]
        common: ReferenceCommon,
        construct_target: Option<Location>,
    },
    PropertyAccess {
        #[serde(flatten)]
        common: ReferenceCommon,
        receiver_location: Option<Location>,
        property_chain: PropertyChain,
        is_optional_chain: bool,
    },
    TypeReference {
        #[serde(flatten)]
        common: ReferenceCommon,
        type_info: TypeInfo,
        context: TypeReferenceContext,
    },
    Assignment {
        #[serde(flatten)]
        common: ReferenceCommon,
        target_location: Option<Location>,
    },
    Return {
        #[serde(flatten)]
        common: ReferenceCommon,
        return_type: Option<String>,
    },
}

impl SymbolReference {
    pub fn common(&self) -> &ReferenceCommon {
        match self {
            Self::Read { common }
            | Self::Write { common }
            | Self::FunctionCall { common }
            | Self::MethodCall { common, .. }
            | Self::SelfReferenceCall { common, .. }
            | Self::ConstructorCall { common, .. }
            | Self::PropertyAccess { common, .. }
            | Self::TypeReference { common, .. }
            | Self::Assignment { common, .. }
            | Self::Return { common, .. } => common,
        }
    }

    pub fn name(&self) -> &SymbolName {
        &self.common().name
    }

    pub fn scope_id(&self) -> &ScopeId {
        &self.common().scope_id
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::Read { .. } => ReferenceKind::Read,
            Self::Write { .. } => ReferenceKind::Write,
            Self::FunctionCall { .. } => ReferenceKind::FunctionCall,
            Self::MethodCall { .. } => ReferenceKind::MethodCall,
            Self::SelfReferenceCall { .. } => ReferenceKind::SelfReferenceCall,
            Self::ConstructorCall { .. } => ReferenceKind::ConstructorCall,
            Self::PropertyAccess { .. } => ReferenceKind::PropertyAccess,
            Self::TypeReference { .. } => ReferenceKind::TypeReference,
            Self::Assignment { .. } => ReferenceKind::Assignment,
            Self::Return { .. } => ReferenceKind::Return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Position;

    fn loc() -> Location {
        Location::new("f.ts", Position::new(1, 1), Position::new(1, 5))
    }

    #[test]
    fn method_call_property_chain_ends_with_name() {
        let r = SymbolReference::MethodCall {
            common: ReferenceCommon {
                name: "list".to_string(),
                location: loc(),
                scope_id: ScopeId::new("module", &loc()),
            },
            receiver_location: Some(loc()),
            property_chain: vec!["api".to_string(), "users".to_string(), "list".to_string()],
            is_optional_chain: false,
        };
        if let SymbolReference::MethodCall { property_chain, .. } = &r {
            assert_eq!(property_chain.last(), Some(&"list".to_string()));
        }
        assert_eq!(r.kind(), ReferenceKind::MethodCall);
    }
}
