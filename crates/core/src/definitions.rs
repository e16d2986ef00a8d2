//! Definition records produced by pass 3, the `DefinitionBuilder` (`SPEC_FULL.md` §3.4).

use crate::ids::{Location, ScopeId, SymbolId, SymbolName};
use serde::{Deserialize, Serialize};

/// Export metadata attached to a definition when a direct export statement
/// encloses it (§4.4.2).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// The renamed external name, e.g. `export { local as external }`.
    pub exported_name: Option<SymbolName>,
    pub is_default: bool,
    pub is_reexport: bool,
}

/// Fields shared by every definition variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionCommon {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub defining_scope_id: ScopeId,
    pub is_exported: bool,
    pub export: Option<ExportInfo>,
}

impl DefinitionCommon {
    pub fn new(symbol_id: SymbolId, name: SymbolName, location: Location, defining_scope_id: ScopeId) -> Self {
        Self {
            symbol_id,
            name,
            location,
            defining_scope_id,
            is_exported: false,
            export: None,
        }
    }

    pub fn with_export(mut self, export: ExportInfo) -> Self {
        self.is_exported = true;
        self.export = Some(export);
        self
    }
}

/// Common read access across every definition kind.
///
/// Used by `SemanticIndex::symbols_by_name` (invariant 7, §8) to enumerate
/// across heterogeneous collections without downcasting.
pub trait Definition {
    fn common(&self) -> &DefinitionCommon;

    fn symbol_id(&self) -> &SymbolId {
        &self.common().symbol_id
    }
    fn name(&self) -> &SymbolName {
        &self.common().name
    }
    fn defining_scope_id(&self) -> &ScopeId {
        &self.common().defining_scope_id
    }
}

macro_rules! impl_definition {
    ($ty:ty) => {
        impl Definition for $ty {
            fn common(&self) -> &DefinitionCommon {
                &self.common
            }
        }
    };
}

/// A single parameter in a function/method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: SymbolName,
    pub type_annotation: Option<String>,
    pub default_value: Option<String>,
    pub is_variadic: bool,
}

/// A function/method's parameter list plus its return type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub common: DefinitionCommon,
    pub signature: FunctionSignature,
    pub docstring: Option<String>,
    pub is_async: bool,
}
impl_definition!(FunctionDefinition);

/// A method owned by a `ClassDefinition`. Methods never appear in
/// `SemanticIndex::functions` - only free functions live at module scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub defining_scope_id: ScopeId,
    pub signature: FunctionSignature,
    pub docstring: Option<String>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_async: bool,
    pub decorators: Vec<String>,
}

/// A property (field) owned by a `ClassDefinition` or `InterfaceDefinition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    pub defining_scope_id: ScopeId,
    /// Extracted verbatim from a type annotation, or from a JSDoc `@type`
    /// comment for untyped JavaScript fields (§4.4.5).
    pub type_annotation: Option<String>,
    pub is_static: bool,
    pub decorators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub common: DefinitionCommon,
    pub methods: Vec<MethodDefinition>,
    pub properties: Vec<PropertyDefinition>,
    pub constructor: Option<MethodDefinition>,
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    pub type_parameters: Vec<String>,
    pub decorators: Vec<String>,
    pub is_abstract: Option<bool>,
}
impl_definition!(ClassDefinition);

/// Tag distinguishing how a variable binding was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKindTag {
    Const,
    Let,
    Var,
    /// A module-level binding with no mutability keyword of its own
    /// (Python module globals, Rust `static`/`const` items already covered
    /// by `Const` - this tag is reserved for languages where "constant"
    /// is a distinct declarative form from `const`, e.g. Python's
    /// by-convention `UPPER_CASE = ...` globals).
    Constant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub common: DefinitionCommon,
    pub kind_tag: VariableKindTag,
    pub type_annotation: Option<String>,
    /// Name of the symbol this variable aliases, e.g. `CONFIG` in
    /// `const handler = CONFIG.get("x")` (§4.4.3).
    pub derived_from: Option<SymbolName>,
}
impl_definition!(VariableDefinition);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceMethod {
    pub name: SymbolName,
    pub location: Location,
    pub signature: FunctionSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    pub common: DefinitionCommon,
    pub methods: Vec<InterfaceMethod>,
    pub properties: Vec<PropertyDefinition>,
    pub extends: Vec<String>,
    pub type_parameters: Vec<String>,
}
impl_definition!(InterfaceDefinition);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: SymbolName,
    pub location: Location,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub common: DefinitionCommon,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
}
impl_definition!(EnumDefinition);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAliasDefinition {
    pub common: DefinitionCommon,
    pub type_parameters: Vec<String>,
    /// The aliased type's text, extracted verbatim from the annotation node.
    pub underlying_type: String,
}
impl_definition!(TypeAliasDefinition);

/// A namespace/module declaration (TypeScript `namespace`, Rust `mod`).
///
/// `member_symbol_ids` holds the raw `SymbolId` strings of definitions
/// declared directly inside the namespace's own scope, regardless of their
/// kind - namespaces are the one definition kind whose members are
/// heterogeneous, so this avoids needing a `SymbolId`-kind union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDefinition {
    pub common: DefinitionCommon,
    pub member_symbol_ids: Vec<String>,
}
impl_definition!(NamespaceDefinition);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
    SideEffect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDefinition {
    pub common: DefinitionCommon,
    pub import_path: String,
    pub import_kind: ImportKind,
    /// The name as written at the source module, before a local `as` alias.
    pub imported_name: Option<SymbolName>,
}
impl_definition!(ImportDefinition);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Position;

    fn loc() -> Location {
        Location::new("f.ts", Position::new(1, 1), Position::new(1, 5))
    }

    #[test]
    fn definition_trait_delegates_to_common() {
        let common = DefinitionCommon::new(
            SymbolId::new("function", "f.ts", "foo", &Position::new(1, 1)),
            "foo".to_string(),
            loc(),
            ScopeId::new("module", &loc()),
        );
        let def = FunctionDefinition {
            common,
            signature: FunctionSignature::default(),
            docstring: None,
            is_async: false,
        };
        assert_eq!(def.name(), "foo");
    }

    #[test]
    fn with_export_sets_is_exported() {
        let common = DefinitionCommon::new(
            SymbolId::new("variable", "f.ts", "CONFIG", &Position::new(1, 1)),
            "CONFIG".to_string(),
            loc(),
            ScopeId::new("module", &loc()),
        )
        .with_export(ExportInfo::default());
        assert!(common.is_exported);
    }
}
