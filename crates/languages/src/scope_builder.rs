//! Pass 2: the Scope Builder (`SPEC_FULL.md` §4.2).

use crate::capture::Capture;
use crate::extractors::{ScopeBoundary, ScopeBoundaryExtractor};
use codesearch_core::capture::Category;
use codesearch_core::error::{Error, Result};
use codesearch_core::ids::{Location, Position, ScopeId};
use codesearch_core::scope::{LexicalScope, ScopeType};
use codesearch_core::IndexerConfig;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Weight large enough that a one-line difference always dominates any
/// plausible column delta when comparing scope areas (§4.2 "Parent
/// selection").
const LINE_WEIGHT: usize = 1_000_000;

fn scope_type_tag(scope_type: ScopeType) -> &'static str {
    match scope_type {
        ScopeType::Module => "module",
        ScopeType::Class => "class",
        ScopeType::Function => "function",
        ScopeType::Method => "method",
        ScopeType::Constructor => "constructor",
        ScopeType::Block => "block",
    }
}

/// Builds the rooted scope tree and precomputes scope depths.
///
/// Returns the scope map, the root scope's id, and the depth of every
/// scope (walked from parent links with a visited set, guarding against
/// the impossible-in-practice case of a cycle, §4.2).
pub fn build(
    captures: &[Capture],
    source: &str,
    file_path: &str,
    file_lines: usize,
    file_end_column: usize,
    extractor: &dyn ScopeBoundaryExtractor,
    config: &IndexerConfig,
) -> Result<(HashMap<ScopeId, LexicalScope>, ScopeId, HashMap<ScopeId, usize>)> {
    let root_location = Location::new(
        file_path.to_string(),
        Position::new(1, 1),
        Position::new(file_lines, file_end_column),
    );
    let root = LexicalScope::new_root(root_location);
    let root_id = root.id.clone();

    let mut scopes: HashMap<ScopeId, LexicalScope> = HashMap::new();
    scopes.insert(root_id.clone(), root);

    let mut boundaries: Vec<ScopeBoundary> = captures
        .iter()
        .filter(|c| c.category() == Category::Scope)
        .map(|c| extractor.extract(c.node, source, file_path))
        .collect::<Result<Vec<_>>>()?;

    // Carry the originating entity alongside each boundary for scope-type
    // mapping; re-derive it by re-filtering captures in lockstep since
    // `extract` only returns locations/name.
    let entities: Vec<String> = captures
        .iter()
        .filter(|c| c.category() == Category::Scope)
        .map(|c| c.entity().to_string())
        .collect();

    if extractor.requires_containment_sort() {
        let mut indices: Vec<usize> = (0..boundaries.len()).collect();
        indices.sort_by(|&a, &b| {
            let (la, lb) = (&boundaries[a].scope_location, &boundaries[b].scope_location);
            if la.contains(lb) && la != lb {
                Ordering::Less
            } else if lb.contains(la) && la != lb {
                Ordering::Greater
            } else {
                lb.area(LINE_WEIGHT).cmp(&la.area(LINE_WEIGHT))
            }
        });
        let sorted_boundaries: Vec<ScopeBoundary> = indices.iter().map(|&i| boundaries[i].clone()).collect();
        let sorted_entities: Vec<String> = indices.iter().map(|&i| entities[i].clone()).collect();
        boundaries = sorted_boundaries;
        insert_scopes(&mut scopes, &boundaries, &sorted_entities)?;
    } else {
        insert_scopes(&mut scopes, &boundaries, &entities)?;
    }

    order_children_by_position(&mut scopes);

    if config.verify_scope_invariants {
        verify_invariants(&scopes)?;
    }

    let depths = compute_depths(&scopes, &root_id);

    Ok((scopes, root_id, depths))
}

fn insert_scopes(
    scopes: &mut HashMap<ScopeId, LexicalScope>,
    boundaries: &[ScopeBoundary],
    entities: &[String],
) -> Result<()> {
    for (boundary, entity) in boundaries.iter().zip(entities.iter()) {
        let scope_type = ScopeType::from_capture_entity(entity);
        let scope_id = ScopeId::new(scope_type_tag(scope_type), &boundary.scope_location);

        let parent_id = select_parent(scopes, &boundary.scope_location);

        let name = match scope_type {
            ScopeType::Block => None,
            _ => boundary.name.clone(),
        };

        let scope = LexicalScope {
            id: scope_id.clone(),
            parent_id: Some(parent_id.clone()),
            name,
            scope_type,
            location: boundary.scope_location.clone(),
            child_ids: Vec::new(),
        };

        if let Some(parent) = scopes.get_mut(&parent_id) {
            parent.child_ids.push(scope_id.clone());
        }
        scopes.insert(scope_id, scope);
    }
    Ok(())
}

/// The smallest already-built scope that spatially contains `location`
/// (§4.2 "Parent selection"). The root scope always qualifies, so this
/// never fails to find a candidate.
fn select_parent(scopes: &HashMap<ScopeId, LexicalScope>, location: &Location) -> ScopeId {
    let mut best: Option<(&ScopeId, i64)> = None;
    for (id, scope) in scopes.iter() {
        if scope.location.contains(location) {
            let area = scope.location.area(LINE_WEIGHT);
            match best {
                Some((_, best_area)) if area >= best_area => {}
                _ => best = Some((id, area)),
            }
        }
    }
    // Unwrap-free: the root scope always contains every location derived
    // from the same file, so `best` is always `Some` once the root is in
    // `scopes` (guaranteed by `build`).
    match best {
        Some((id, _)) => id.clone(),
        None => unreachable_root_missing(),
    }
}

fn unreachable_root_missing() -> ScopeId {
    // The root scope is inserted before any call to `select_parent`; this
    // path is unreachable in practice and exists only so the function has
    // a total return type without an `unwrap`.
    ScopeId::new("module", &Location::new(String::new(), Position::new(1, 1), Position::new(1, 1)))
}

fn order_children_by_position(scopes: &mut HashMap<ScopeId, LexicalScope>) {
    let starts: HashMap<ScopeId, Position> = scopes
        .iter()
        .map(|(id, s)| (id.clone(), s.location.start))
        .collect();
    for scope in scopes.values_mut() {
        scope.child_ids.sort_by_key(|id| starts.get(id).copied().unwrap_or(Position::new(0, 0)));
    }
}

fn compute_depths(scopes: &HashMap<ScopeId, LexicalScope>, root_id: &ScopeId) -> HashMap<ScopeId, usize> {
    let mut depths = HashMap::new();
    for id in scopes.keys() {
        if depths.contains_key(id) {
            continue;
        }
        let mut chain = Vec::new();
        let mut current = Some(id.clone());
        let mut visited = std::collections::HashSet::new();
        while let Some(cur) = current {
            if !visited.insert(cur.clone()) {
                break; // cycle guard; impossible in a well-formed tree
            }
            if let Some(d) = depths.get(&cur) {
                let base = *d;
                for (i, ancestor_id) in chain.iter().rev().enumerate() {
                    depths.insert(ancestor_id.clone(), base + i + 1);
                }
                chain.clear();
                break;
            }
            chain.push(cur.clone());
            current = scopes.get(&cur).and_then(|s| s.parent_id.clone());
        }
        if !chain.is_empty() {
            // Reached the root without finding a memoized depth.
            for (i, ancestor_id) in chain.iter().rev().enumerate() {
                depths.insert(ancestor_id.clone(), i);
            }
        }
    }
    depths.entry(root_id.clone()).or_insert(0);
    depths
}

fn verify_invariants(scopes: &HashMap<ScopeId, LexicalScope>) -> Result<()> {
    for scope in scopes.values() {
        if let Some(parent_id) = &scope.parent_id {
            let parent = scopes
                .get(parent_id)
                .ok_or_else(|| Error::invalid_input(format!("scope {} has dangling parent {parent_id}", scope.id)))?;
            if !parent.location.contains(&scope.location) {
                return Err(Error::invalid_input(format!(
                    "scope {} is not contained in its parent {}",
                    scope.id, parent.id
                )));
            }
            if !parent.child_ids.contains(&scope.id) {
                return Err(Error::invalid_input(format!(
                    "scope {} missing from parent {}'s child_ids",
                    scope.id, parent.id
                )));
            }
        }
        for sibling_id in sibling_ids(scopes, scope) {
            if sibling_id == scope.id {
                continue;
            }
            if let Some(sibling) = scopes.get(&sibling_id) {
                if scope.location.overlaps(&sibling.location) {
                    return Err(Error::invalid_input(format!(
                        "sibling scopes {} and {} overlap",
                        scope.id, sibling.id
                    )));
                }
            }
        }
    }
    Ok(())
}

fn sibling_ids(scopes: &HashMap<ScopeId, LexicalScope>, scope: &LexicalScope) -> Vec<ScopeId> {
    match &scope.parent_id {
        Some(parent_id) => scopes
            .get(parent_id)
            .map(|p| p.child_ids.clone())
            .unwrap_or_default(),
        None => Vec::new(),
    }
}
