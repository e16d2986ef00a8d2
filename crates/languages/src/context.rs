//! `ProcessingContext`: the read-only record passed to passes 3 and 4 (`SPEC_FULL.md` §4.3).

use crate::capture::Capture;
use codesearch_core::error::{Error, Result};
use codesearch_core::ids::{Location, Position, ScopeId, SymbolName};
use codesearch_core::scope::LexicalScope;
use std::collections::HashMap;

const LINE_WEIGHT: usize = 1_000_000;

pub struct ProcessingContext<'a> {
    pub captures: &'a [Capture<'a>],
    scopes: HashMap<ScopeId, LexicalScope>,
    scope_depths: HashMap<ScopeId, usize>,
    pub root_scope_id: ScopeId,
}

impl<'a> ProcessingContext<'a> {
    pub fn new(
        captures: &'a [Capture<'a>],
        scopes: HashMap<ScopeId, LexicalScope>,
        scope_depths: HashMap<ScopeId, usize>,
        root_scope_id: ScopeId,
    ) -> Self {
        Self {
            captures,
            scopes,
            scope_depths,
            root_scope_id,
        }
    }

    pub fn scope(&self, id: &ScopeId) -> Option<&LexicalScope> {
        self.scopes.get(id)
    }

    pub fn depth_of(&self, id: &ScopeId) -> usize {
        self.scope_depths.get(id).copied().unwrap_or(0)
    }

    /// Returns the deepest scope whose span contains `location` (§4.3).
    ///
    /// Ties at equal depth are a malformed-scope-tree condition, not a
    /// silent pick - they fail fast naming both conflicting scope IDs (§7).
    pub fn get_scope_id(&self, location: &Location) -> Result<ScopeId> {
        let point = &location.start;
        let mut best: Option<(&ScopeId, usize, i64)> = None;
        let mut tie: Option<&ScopeId> = None;

        for (id, scope) in self.scopes.iter() {
            if scope.location.contains_point(point) || scope.location.contains(location) {
                let depth = self.depth_of(id);
                let area = scope.location.area(LINE_WEIGHT);
                match best {
                    None => best = Some((id, depth, area)),
                    Some((_, best_depth, _)) if depth > best_depth => {
                        best = Some((id, depth, area));
                        tie = None;
                    }
                    Some((_, best_depth, _)) if depth == best_depth => {
                        tie = Some(id);
                    }
                    _ => {}
                }
            }
        }

        match (best, tie) {
            (Some((id, _, _)), Some(other)) if id != other => {
                Err(Error::ambiguous_scope(id.to_string(), other.to_string()))
            }
            (Some((id, _, _)), _) => Ok(id.clone()),
            (None, _) => Ok(self.root_scope_id.clone()),
        }
    }

    /// Finds the unique child of `scope_id` named `name` (§4.3). Fatal with
    /// a diagnostic naming both the parent and the target when absent (§7).
    pub fn get_child_scope_with_symbol_name(&self, scope_id: &ScopeId, name: &SymbolName) -> Result<ScopeId> {
        let parent = self
            .scopes
            .get(scope_id)
            .ok_or_else(|| Error::missing_child_scope(scope_id.to_string(), name.clone()))?;

        parent
            .child_ids
            .iter()
            .find(|child_id| {
                self.scopes
                    .get(*child_id)
                    .and_then(|c| c.name.as_deref())
                    == Some(name.as_str())
            })
            .cloned()
            .ok_or_else(|| Error::missing_child_scope(scope_id.to_string(), name.clone()))
    }

    pub fn into_scopes(self) -> HashMap<ScopeId, LexicalScope> {
        self.scopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::scope::ScopeType;

    fn loc(sl: usize, sc: usize, el: usize, ec: usize) -> Location {
        Location::new("f.ts", Position::new(sl, sc), Position::new(el, ec))
    }

    fn make_ctx() -> ProcessingContext<'static> {
        let root_loc = loc(1, 1, 10, 1);
        let root_id = ScopeId::new("module", &root_loc);
        let class_loc = loc(2, 1, 5, 1);
        let class_id = ScopeId::new("class", &class_loc);

        let mut scopes = HashMap::new();
        scopes.insert(
            root_id.clone(),
            LexicalScope {
                id: root_id.clone(),
                parent_id: None,
                name: None,
                scope_type: ScopeType::Module,
                location: root_loc,
                child_ids: vec![class_id.clone()],
            },
        );
        scopes.insert(
            class_id.clone(),
            LexicalScope {
                id: class_id.clone(),
                parent_id: Some(root_id.clone()),
                name: Some("MyClass".to_string()),
                scope_type: ScopeType::Class,
                location: loc(2, 1, 5, 1),
                child_ids: vec![],
            },
        );

        let mut depths = HashMap::new();
        depths.insert(root_id.clone(), 0);
        depths.insert(class_id, 1);

        ProcessingContext::new(&[], scopes, depths, root_id)
    }

    #[test]
    fn get_scope_id_picks_deepest_containing_scope() {
        let ctx = make_ctx();
        let id = ctx.get_scope_id(&loc(3, 1, 3, 5)).expect("scope");
        assert_eq!(ctx.scope(&id).expect("scope exists").scope_type, ScopeType::Class);
    }

    #[test]
    fn get_child_scope_with_symbol_name_finds_named_child() {
        let ctx = make_ctx();
        let id = ctx
            .get_child_scope_with_symbol_name(&ctx.root_scope_id.clone(), &"MyClass".to_string())
            .expect("child");
        assert_eq!(ctx.scope(&id).expect("scope exists").name.as_deref(), Some("MyClass"));
    }

    #[test]
    fn get_child_scope_with_symbol_name_errors_when_absent() {
        let ctx = make_ctx();
        let err = ctx
            .get_child_scope_with_symbol_name(&ctx.root_scope_id.clone(), &"Nonexistent".to_string())
            .unwrap_err();
        assert!(err.to_string().contains("Nonexistent"));
    }
}
