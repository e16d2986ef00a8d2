//! Primitive identifiers shared by every artifact in the semantic index.
//!
//! See `SPEC_FULL.md` §3.1. All locations use 1-based, inclusive-start /
//! exclusive-end line and column numbers, derived from the parser's 0-based
//! row/column by adding 1 uniformly. No other convention is used anywhere
//! in this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for the file being indexed.
///
/// Callers are free to use a relative path, an absolute path, or a
/// synthetic identifier; the pipeline treats it as an opaque string used
/// only to build `ScopeId`/`SymbolId` values and to stamp `Location`.
pub type FilePath = String;

/// A symbol's textual name as it appears in source.
pub type SymbolName = String;

/// A single point in the source file, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Build a `Position` from a tree-sitter style 0-based row/column pair.
    pub fn from_zero_based(row: usize, column: usize) -> Self {
        Self {
            line: row + 1,
            column: column + 1,
        }
    }
}

/// A span within a file: `(file_path, start_line, start_column, end_line, end_column)`.
///
/// Start is inclusive, end is exclusive, matching the convention used to
/// derive every location from the parser's 0-based node positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file_path: FilePath,
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(file_path: impl Into<FilePath>, start: Position, end: Position) -> Self {
        Self {
            file_path: file_path.into(),
            start,
            end,
        }
    }

    /// `true` when `self` spatially contains `other` (inclusive of equal bounds).
    pub fn contains(&self, other: &Location) -> bool {
        self.file_path == other.file_path
            && self.start <= other.start
            && other.end <= self.end
    }

    /// `true` when `self` spatially contains the single point `point`.
    pub fn contains_point(&self, point: &Position) -> bool {
        self.start <= *point && *point < self.end
    }

    /// `true` when `self` and `other` overlap (share at least one point),
    /// without one fully containing the other being required.
    pub fn overlaps(&self, other: &Location) -> bool {
        self.file_path == other.file_path && self.start < other.end && other.start < self.end
    }

    /// Area used to disambiguate "smallest containing scope" (see
    /// `ScopeBuilder::select_parent`). `line_weight` must dominate any
    /// plausible column delta so that line differences always win.
    pub fn area(&self, line_weight: usize) -> i64 {
        let start = self.start.line as i64 * line_weight as i64 + self.start.column as i64;
        let end = self.end.line as i64 * line_weight as i64 + self.end.column as i64;
        end - start
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.file_path, self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Deterministic identifier for a `LexicalScope`:
/// `"{type}:{file}:{start_line}:{start_column}:{end_line}:{end_column}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(scope_type: &str, location: &Location) -> Self {
        Self(format!(
            "{}:{}:{}:{}:{}:{}",
            scope_type,
            location.file_path,
            location.start.line,
            location.start.column,
            location.end.line,
            location.end.column
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic identifier for a definition:
/// `"{kind}:{file}:{name}:{start_line}:{start_column}"`.
///
/// Collisions within a single file are a bug in the handler that produced
/// them (see `SPEC_FULL.md` §3.1), not a condition this type guards against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(kind: &str, file_path: &str, name: &str, start: &Position) -> Self {
        Self(format!(
            "{kind}:{file_path}:{name}:{}:{}",
            start.line, start.column
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(sl: usize, sc: usize, el: usize, ec: usize) -> Location {
        Location::new("f.ts", Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn contains_is_inclusive_start_exclusive_end() {
        let outer = loc(1, 1, 10, 1);
        let inner = loc(2, 1, 3, 1);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn scope_id_is_deterministic() {
        let a = ScopeId::new("class", &loc(1, 1, 5, 1));
        let b = ScopeId::new("class", &loc(1, 1, 5, 1));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "class:f.ts:1:1:5:1");
    }

    #[test]
    fn symbol_id_includes_kind_and_start() {
        let id = SymbolId::new("function", "f.ts", "foo", &Position::new(3, 1));
        assert_eq!(id.as_str(), "function:f.ts:foo:3:1");
    }

    #[test]
    fn position_from_zero_based_adds_one() {
        let p = Position::from_zero_based(0, 0);
        assert_eq!(p, Position::new(1, 1));
    }

    #[test]
    fn area_uses_line_weight_to_dominate_columns() {
        let small = loc(1, 1, 1, 5);
        let big = loc(1, 1, 100, 1);
        assert!(small.area(10_000) < big.area(10_000));
    }
}
