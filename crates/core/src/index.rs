//! The pipeline's single output type (`SPEC_FULL.md` §6).

use crate::definitions::{
    ClassDefinition, EnumDefinition, FunctionDefinition, ImportDefinition, InterfaceDefinition,
    NamespaceDefinition, TypeAliasDefinition, VariableDefinition,
};
use crate::ids::{FilePath, ScopeId, SymbolId};
use crate::references::SymbolReference;
use crate::scope::LexicalScope;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;

/// One of the four source languages this crate can build an index for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Rust,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Rust => "rust",
        }
    }
}

/// The semantic model of a single source file (§6).
///
/// Every collection is keyed by `SymbolId` except `references`, whose order
/// is capture order and carries no semantic meaning (§3.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticIndex {
    pub file_path: FilePath,
    pub language: Option<Language>,
    pub root_scope_id: Option<ScopeId>,
    pub scopes: HashMap<ScopeId, LexicalScope>,
    pub functions: HashMap<SymbolId, FunctionDefinition>,
    pub classes: HashMap<SymbolId, ClassDefinition>,
    pub variables: HashMap<SymbolId, VariableDefinition>,
    pub interfaces: HashMap<SymbolId, InterfaceDefinition>,
    pub enums: HashMap<SymbolId, EnumDefinition>,
    pub namespaces: HashMap<SymbolId, NamespaceDefinition>,
    pub types: HashMap<SymbolId, TypeAliasDefinition>,
    pub imported_symbols: HashMap<SymbolId, ImportDefinition>,
    pub references: Vec<SymbolReference>,
}

impl SemanticIndex {
    pub fn new(file_path: impl Into<FilePath>, language: Language) -> Self {
        Self {
            file_path: file_path.into(),
            language: Some(language),
            ..Default::default()
        }
    }

    /// Enumerates every definition (of any kind) whose name equals `name`
    /// (invariant 7, §8). Used by tests and by downstream resolvers that
    /// have no use for per-kind collections.
    pub fn symbols_by_name(&self, name: &str) -> Vec<&str> {
        use crate::definitions::Definition;

        let mut ids = Vec::new();
        ids.extend(self.functions.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids.extend(self.classes.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids.extend(self.variables.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids.extend(self.interfaces.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids.extend(self.enums.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids.extend(self.namespaces.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids.extend(self.types.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids.extend(self.imported_symbols.values().filter(|d| d.name() == name).map(|d| d.symbol_id().as_str()));
        ids
    }

    /// Total count of top-level definitions across every kind, for
    /// sanity-checking fixture expectations in tests.
    pub fn definition_count(&self) -> usize {
        self.functions.len()
            + self.classes.len()
            + self.variables.len()
            + self.interfaces.len()
            + self.enums.len()
            + self.namespaces.len()
            + self.types.len()
            + self.imported_symbols.len()
    }
}
