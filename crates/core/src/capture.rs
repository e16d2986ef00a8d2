//! Capture name parsing (`SPEC_FULL.md` §3.2).
//!
//! A capture's dotted name (`"category.entity[.subtag...]"`) is the only
//! contract between the `.scm`-style query files (out of scope here) and
//! this crate. Parsing it once, up front, keeps every later pass working
//! with a typed `Category` instead of re-splitting strings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The category segment of a capture name.
///
/// Captures whose name begins with `_` are filtered out by the query
/// runner before a `CaptureName` is ever constructed - they exist only for
/// query-internal predicates and never reach this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Scope,
    Definition,
    Reference,
    Import,
    Export,
    Type,
    Assignment,
    Return,
    Decorator,
    Modifier,
}

impl Category {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "scope" => Some(Self::Scope),
            "definition" => Some(Self::Definition),
            "reference" => Some(Self::Reference),
            "import" => Some(Self::Import),
            "export" => Some(Self::Export),
            "type" => Some(Self::Type),
            "assignment" => Some(Self::Assignment),
            "return" => Some(Self::Return),
            "decorator" => Some(Self::Decorator),
            "modifier" => Some(Self::Modifier),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Scope => "scope",
            Self::Definition => "definition",
            Self::Reference => "reference",
            Self::Import => "import",
            Self::Export => "export",
            Self::Type => "type",
            Self::Assignment => "assignment",
            Self::Return => "return",
            Self::Decorator => "decorator",
            Self::Modifier => "modifier",
        };
        f.write_str(s)
    }
}

/// A parsed capture name: `"category.entity[.subtag...]"`.
///
/// `entity` is deliberately a plain string rather than a closed enum -
/// the set of entities (class, method, function, variable, property,
/// call, ...) varies per language and per query file, and the query file
/// is out of scope for this crate; see §3.2.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureName {
    pub raw: String,
    pub category: Category,
    pub entity: String,
    pub subtags: Vec<String>,
}

impl CaptureName {
    /// Parses a dotted capture name, rejecting unknown categories.
    ///
    /// The entity itself is never validated against an enumeration - an
    /// unrecognized entity is simply routed to no handler and silently
    /// ignored by the builder that consumes it (see `HandlerTable::get`).
    /// Only a malformed or unknown *category*, or a name with no entity
    /// segment at all, is fatal (§4.1, §7).
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('.');
        let category_str = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::unknown_capture(raw, "empty capture name"))?;
        let category = Category::parse(category_str)
            .ok_or_else(|| Error::unknown_capture(raw, format!("unknown category `{category_str}`")))?;
        let entity = parts
            .next()
            .ok_or_else(|| Error::unknown_capture(raw, "missing entity segment"))?
            .to_string();
        let subtags = parts.map(str::to_string).collect();

        Ok(Self {
            raw: raw.to_string(),
            category,
            entity,
            subtags,
        })
    }

    /// `true` when this capture's name contains `needle` anywhere - used by
    /// the reference kind classifier's "capture name contains X" rules
    /// (§4.5.1 rules 3 and 4).
    pub fn contains(&self, needle: &str) -> bool {
        self.raw.contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_name() {
        let c = CaptureName::parse("definition.class").unwrap();
        assert_eq!(c.category, Category::Definition);
        assert_eq!(c.entity, "class");
        assert!(c.subtags.is_empty());
    }

    #[test]
    fn parses_subtags() {
        let c = CaptureName::parse("definition.function.documentation").unwrap();
        assert_eq!(c.entity, "function");
        assert_eq!(c.subtags, vec!["documentation".to_string()]);
    }

    #[test]
    fn rejects_unknown_category() {
        let err = CaptureName::parse("bogus.class").unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn rejects_missing_entity() {
        assert!(CaptureName::parse("definition").is_err());
    }

    #[test]
    fn contains_matches_full_raw_name() {
        let c = CaptureName::parse("reference.method_call").unwrap();
        assert!(c.contains("method"));
        assert!(!c.contains("constructor"));
    }
}
