//! Core data model for the semantic indexing pipeline.
//!
//! This crate owns every type that survives a single file's indexing run:
//! primitive identifiers, the lexical scope tree, definition and reference
//! records, and the `SemanticIndex` they assemble into. It holds no
//! tree-sitter references and performs no extraction itself - that is
//! `codesearch-languages`'s job (`SPEC_FULL.md` §5: "the returned index
//! contains only owned data").

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod capture;
pub mod config;
pub mod definitions;
pub mod error;
pub mod ids;
pub mod index;
pub mod references;
pub mod scope;

pub use capture::{CaptureName, Category};
pub use config::IndexerConfig;
pub use definitions::{
    ClassDefinition, Definition, DefinitionCommon, EnumDefinition, EnumMember, ExportInfo,
    FunctionDefinition, FunctionSignature, ImportDefinition, ImportKind, InterfaceDefinition,
    InterfaceMethod, MethodDefinition, NamespaceDefinition, Parameter, PropertyDefinition,
    TypeAliasDefinition, VariableDefinition, VariableKindTag,
};
pub use error::{Error, Result};
pub use ids::{FilePath, Location, Position, ScopeId, SymbolId, SymbolName};
pub use index::{Language, SemanticIndex};
pub use references::{
    PropertyChain, ReferenceCommon, ReferenceKind, SelfKeyword, SymbolReference, TypeCertainty,
    TypeInfo, TypeReferenceContext,
};
pub use scope::{LexicalScope, ScopeType};

/// Version of the core data-model crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
