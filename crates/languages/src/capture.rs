//! The borrowed `Capture` type that flows through passes 1-4 (`SPEC_FULL.md` §3.2).
//!
//! A `Capture` never outlives the pipeline call - it holds a borrowed
//! `tree_sitter::Node` and a borrowed source slice, both tied to the
//! `Tree`/`&str` the caller passed into `build_semantic_index`. Every
//! artifact the pipeline *returns* (scopes, definitions, references) copies
//! out whatever owned data it needs from a `Capture` before returning (§5:
//! "the returned index contains only owned data").

use codesearch_core::capture::CaptureName;
use codesearch_core::ids::Location;
use tree_sitter::Node;

/// One query match's capture: a parsed name, the captured node, its source
/// text, and its location.
#[derive(Debug, Clone)]
pub struct Capture<'a> {
    pub name: CaptureName,
    pub node: Node<'a>,
    pub text: &'a str,
    pub location: Location,
}

impl<'a> Capture<'a> {
    pub fn category(&self) -> codesearch_core::capture::Category {
        self.name.category
    }

    pub fn entity(&self) -> &str {
        &self.name.entity
    }
}
