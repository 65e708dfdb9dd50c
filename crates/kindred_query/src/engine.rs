//! Query evaluation.
//!
//! [`evaluate`] answers from the cache when it can. Otherwise it computes
//! the result of the query's variant, evaluating sub-queries through the
//! same cache, and stores the result with everything it read.

use kindred_foundation::{Entity, EntitySet, Error, QueryProblem, RelationKey, Result, Value};
use kindred_storage::{Atom, LookupKey, Slot, Store};
use tracing::trace;

use crate::cache::{Dependencies, QueryCache};
use crate::query::{Query, QueryKind, RelationQuery, Selector, check_all};

/// Evaluates `query` against `store`.
///
/// The returned set is a snapshot: later mutations never show up in it and
/// changing it never affects the cache.
///
/// # Errors
///
/// Returns an invalid query error for a malformed `All` query.
pub fn evaluate(store: &Store, cache: &mut QueryCache, query: &Query) -> Result<EntitySet> {
    if let Some(hit) = cache.get(query) {
        return Ok(hit);
    }
    trace!(?query, "compiling query");
    let mut deps = Dependencies::default();
    let result = compile(store, cache, query, &mut deps)?;
    cache.insert(query.clone(), result.clone(), deps);
    Ok(result)
}

/// Evaluates a sub-query and records the dependency on it.
fn evaluate_sub(
    store: &Store,
    cache: &mut QueryCache,
    query: &Query,
    deps: &mut Dependencies,
) -> Result<EntitySet> {
    let result = evaluate(store, cache, query)?;
    deps.queries.push(query.clone());
    Ok(result)
}

fn compile(
    store: &Store,
    cache: &mut QueryCache,
    query: &Query,
    deps: &mut Dependencies,
) -> Result<EntitySet> {
    match query.kind() {
        QueryKind::Component(key) => {
            deps.atoms.push(Atom::Component(key.clone()));
            Ok(store.component_holders(key))
        }
        QueryKind::Tag(tag) => {
            deps.atoms.push(Atom::Tag(tag.clone()));
            Ok(store.tag_holders(tag))
        }
        QueryKind::Relation(relation) => compile_relation(store, cache, relation, deps),
        QueryKind::All { all_of, none_of } => {
            check_all(all_of, none_of)?;
            let mut sets = all_of
                .iter()
                .map(|sub| evaluate_sub(store, cache, sub, deps))
                .collect::<Result<Vec<EntitySet>>>()?;
            sets.sort_by_key(EntitySet::len);
            let mut sets = sets.into_iter();
            let Some(mut result) = sets.next() else {
                return Err(Error::invalid_query(QueryProblem::NoInclusions));
            };
            for set in sets {
                result.retain(|e| set.contains(e));
            }
            if result.is_empty() {
                return Ok(result);
            }
            for sub in none_of {
                let excluded = evaluate_sub(store, cache, sub, deps)?;
                result.retain(|e| !excluded.contains(e));
            }
            Ok(result)
        }
        QueryKind::Any(queries) => {
            let sets = queries
                .iter()
                .map(|sub| evaluate_sub(store, cache, sub, deps))
                .collect::<Result<Vec<EntitySet>>>()?;
            Ok(EntitySet::unions(sets))
        }
        QueryKind::Propagate { sub, traverse, depth } => {
            compile_propagation(store, cache, sub, traverse, *depth, deps)
        }
    }
}

fn compile_relation(
    store: &Store,
    cache: &mut QueryCache,
    relation: &RelationQuery,
    deps: &mut Dependencies,
) -> Result<EntitySet> {
    let lookup = store.lookup();
    match relation {
        RelationQuery::Origins { key, target } => {
            let slots = selector_slots(store, cache, target, deps)?;
            Ok(union_over(slots, deps, |slot| LookupKey::origins(key.clone(), slot), |k| lookup.entities(k)))
        }
        RelationQuery::Targets { origin, key } => {
            let slots = selector_slots(store, cache, origin, deps)?;
            Ok(union_over(slots, deps, |slot| LookupKey::targets(slot, key.clone()), |k| lookup.entities(k)))
        }
    }
}

/// Resolves a selector to the lookup slots it stands for.
///
/// A sub-query selector becomes one slot per matching entity. The relation
/// result then depends on the sub-query instead of on each slot.
fn selector_slots(
    store: &Store,
    cache: &mut QueryCache,
    selector: &Selector,
    deps: &mut Dependencies,
) -> Result<Vec<(Slot, bool)>> {
    Ok(match selector {
        Selector::Entity(entity) => vec![(Slot::Entity(*entity), true)],
        Selector::Any => vec![(Slot::Any, true)],
        Selector::Matching(sub) => evaluate_sub(store, cache, sub, deps)?
            .into_iter()
            .map(|entity| (Slot::Entity(entity), false))
            .collect(),
    })
}

/// Unions the lookup sets for `slots`, registering the directly named ones.
fn union_over(
    slots: Vec<(Slot, bool)>,
    deps: &mut Dependencies,
    key_for: impl Fn(Slot) -> LookupKey,
    read: impl Fn(&LookupKey) -> EntitySet,
) -> EntitySet {
    let mut result = EntitySet::new();
    for (slot, direct) in slots {
        let key = key_for(slot);
        result.extend(read(&key));
        if direct {
            deps.atoms.push(Atom::Relation(key));
        }
    }
    result
}

/// Expands `sub` along the inverse traversal edges, breadth first.
///
/// Only entities something inherits from can spread, so the first frontier
/// is cut down to the targets of the traversal keys. Each round adds the
/// entities pointing at the previous round's new entities and stops when a
/// round finds nothing new or the depth limit is reached.
fn compile_propagation(
    store: &Store,
    cache: &mut QueryCache,
    sub: &Query,
    traverse: &[Value],
    depth: Option<u32>,
    deps: &mut Dependencies,
) -> Result<EntitySet> {
    let mut cumulative = evaluate_sub(store, cache, sub, deps)?;
    let inherited_from = Query::any(
        traverse
            .iter()
            .map(|key| Query::targets(Selector::Any, RelationKey::Tag(key.clone()))),
    )?;
    let inherited_from = evaluate_sub(store, cache, &inherited_from, deps)?;

    let mut unchecked: Vec<Entity> = cumulative
        .iter()
        .filter(|e| inherited_from.contains(*e))
        .copied()
        .collect();
    let lookup = store.lookup();
    let mut round = 0;
    while !unchecked.is_empty() && depth.is_none_or(|max| round < max) {
        round += 1;
        let mut found = EntitySet::new();
        for key in traverse {
            let key = RelationKey::Tag(key.clone());
            for entity in &unchecked {
                if let Some(origins) = lookup.get(&LookupKey::origins(key.clone(), *entity)) {
                    found.extend(origins.iter().copied().filter(|e| !cumulative.contains(e)));
                }
            }
        }
        trace!(round, found = found.len(), "propagation round");
        unchecked = found.iter().copied().collect();
        cumulative.extend(found);
    }
    Ok(cumulative)
}
