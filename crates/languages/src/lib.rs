//! Four-pass semantic indexing pipeline (`SPEC_FULL.md` §2).
//!
//! `build_semantic_index` is the crate's single entry point (§6): given a
//! parsed syntax tree and the language it was parsed as, it runs the Query
//! Runner, Scope Builder, Definition Builder, and Reference Builder in
//! order and returns an owned `SemanticIndex`. Each pass is implemented in
//! its own module; per-language scope-boundary and metadata extraction
//! strategies live under `javascript`, `typescript`, `python`, and `rust`.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod capture;
pub mod context;
pub mod definition_builder;
pub mod extractors;
pub mod node_ext;
pub mod query_runner;
pub mod reference_builder;
pub mod scope_builder;

pub mod javascript;
pub mod python;
pub mod rust;
pub mod typescript;

use codesearch_core::error::Result;
use codesearch_core::{IndexerConfig, Language, SemanticIndex};
use std::path::Path;
use tracing::debug_span;
use tree_sitter::Tree;

/// The file being indexed, plus the metadata the pipeline needs but cannot
/// derive from the tree alone (§6's `parsed_file` record).
pub struct ParsedFile<'a> {
    pub file_path: &'a Path,
    pub file_lines: usize,
    pub file_end_column: usize,
    pub source: &'a str,
}

/// Runs the full four-pass pipeline over a single parsed file (§2, §6).
///
/// Passes run strictly in order; each depends only on state produced by
/// earlier passes, never mutating it (§2: "No pass mutates artifacts of an
/// earlier pass").
pub fn build_semantic_index(
    parsed_file: &ParsedFile,
    tree: &Tree,
    language: Language,
    config: &IndexerConfig,
) -> Result<SemanticIndex> {
    let file_path = parsed_file.file_path.to_string_lossy().to_string();
    let _span = debug_span!("build_semantic_index", file = %file_path, language = %language).entered();

    let registry = registry_for(language)?;

    let captures = {
        let _span = debug_span!("query_runner").entered();
        query_runner::run(tree, parsed_file.source, registry.query(), &file_path)?
    };
    tracing::debug!(count = captures.len(), "captures produced");

    let (scopes, root_scope_id, scope_depths) = {
        let _span = debug_span!("scope_builder").entered();
        scope_builder::build(
            &captures,
            parsed_file.source,
            &file_path,
            parsed_file.file_lines,
            parsed_file.file_end_column,
            registry.scope_boundary_extractor(),
            config,
        )?
    };

    let ctx = context::ProcessingContext::new(&captures, scopes, scope_depths, root_scope_id.clone());

    let mut builder = definition_builder::DefinitionBuilder::new(file_path.clone());
    {
        let _span = debug_span!("definition_builder").entered();
        definition_builder::run(&ctx, registry.handler_table(), &mut builder, parsed_file.source, config)?;
    }

    let references = {
        let _span = debug_span!("reference_builder").entered();
        reference_builder::run(&ctx, registry.metadata_extractor(), parsed_file.source, &file_path)?
    };

    let mut index = builder.into_index(language, root_scope_id);
    index.scopes = ctx.into_scopes();
    index.references = references;
    Ok(index)
}

/// A language's complete strategy set: its query, scope boundary extractor,
/// metadata extractor, and handler table (§4.6, §4.4.1).
pub trait LanguageRegistry: Send + Sync {
    fn query(&self) -> &'static str;
    fn scope_boundary_extractor(&self) -> &dyn extractors::ScopeBoundaryExtractor;
    fn metadata_extractor(&self) -> &dyn extractors::MetadataExtractor;
    fn handler_table(&self) -> &definition_builder::HandlerTable;
}

fn registry_for(language: Language) -> Result<Box<dyn LanguageRegistry>> {
    match language {
        Language::JavaScript => Ok(Box::new(javascript::registry())),
        Language::TypeScript => Ok(Box::new(typescript::registry())),
        Language::Python => Ok(Box::new(python::registry())),
        Language::Rust => Ok(Box::new(rust::registry())),
    }
}
