//! Inheritance traversal.
//!
//! An entity inherits from the entities it points at through the traversal
//! keys, usually just `is-a`. [`Traverse`] walks that graph depth-first,
//! starting with the entity itself. At every node the keys are consulted in
//! order and the first listed key is explored first. Each node is visited at
//! most once, so cyclic ancestries terminate.
//!
//! A traversal key must have at most one target per node. A node with two
//! `is-a` parents is a broken model, and the walk fails with a contract
//! violation instead of picking one. The node itself is still yielded, so
//! a lookup answered by its own data never sees the error.

use std::collections::HashSet;

use kindred_foundation::{ComponentKey, Entity, EntitySet, Error, ErrorContext, RelationKey, Result, Value};
use tracing::warn;

use crate::store::Store;

/// Depth-first walk over an entity and its ancestors.
///
/// Yields the start entity first. With no traversal keys it yields only the
/// start entity. A node's parents are resolved when the walk moves past it.
#[derive(Debug)]
pub struct Traverse<'a> {
    store: &'a Store,
    keys: &'a [Value],
    stack: Vec<Entity>,
    visited: HashSet<Entity>,
    path: Vec<Entity>,
    expand: Option<Entity>,
}

impl<'a> Traverse<'a> {
    /// Starts a walk at `start` following `keys`.
    #[must_use]
    pub fn new(store: &'a Store, start: Entity, keys: &'a [Value]) -> Self {
        Self {
            store,
            keys,
            stack: vec![start],
            visited: HashSet::from([start]),
            path: Vec::new(),
            expand: None,
        }
    }

    fn parent(&self, entity: Entity, key: &Value) -> Result<Option<Entity>> {
        let mut targets = self.store.relation_targets(entity, key);
        let Some(first) = targets.next() else {
            return Ok(None);
        };
        if targets.next().is_some() {
            let count = self.store.relation_target_count(entity, key);
            warn!(?entity, ?key, count, "traversal key has several targets");
            let context = self
                .path
                .iter()
                .fold(ErrorContext::new().with_operation("traverse"), |ctx, e| ctx.with_step(*e));
            return Err(Error::contract_violation(format!(
                "{entity:?} has {count} targets for traversal key {key:?}"
            ))
            .with_context(context));
        }
        Ok(Some(first))
    }
}

impl Iterator for Traverse<'_> {
    type Item = Result<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        // Parents of the previous node are looked up only once the caller
        // asks to go past it.
        if let Some(entity) = self.expand.take() {
            for key in self.keys.iter().rev() {
                match self.parent(entity, key) {
                    Ok(Some(parent)) => {
                        if self.visited.insert(parent) {
                            self.stack.push(parent);
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        self.stack.clear();
                        return Some(Err(err));
                    }
                }
            }
        }
        let entity = self.stack.pop()?;
        self.path.push(entity);
        self.expand = Some(entity);
        Some(Ok(entity))
    }
}

/// Finds the first entity in traversal order that holds `key` directly.
///
/// Returns the owning entity and its value.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_component<'a>(
    store: &'a Store,
    entity: Entity,
    key: &ComponentKey,
    keys: &[Value],
) -> Result<Option<(Entity, &'a Value)>> {
    for node in Traverse::new(store, entity, keys) {
        let node = node?;
        if let Some(value) = store.component(node, key) {
            return Ok(Some((node, value)));
        }
    }
    Ok(None)
}

/// Union of the component keys held anywhere along the walk.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_component_keys(
    store: &Store,
    entity: Entity,
    keys: &[Value],
) -> Result<HashSet<ComponentKey>> {
    let mut found = HashSet::new();
    for node in Traverse::new(store, entity, keys) {
        found.extend(store.component_keys(node?).cloned());
    }
    Ok(found)
}

/// Checks whether any entity along the walk holds `tag`.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn has_inherited_tag(store: &Store, entity: Entity, tag: &Value, keys: &[Value]) -> Result<bool> {
    for node in Traverse::new(store, entity, keys) {
        if store.has_tag(node?, tag) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Union of the tags held anywhere along the walk.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_tags(store: &Store, entity: Entity, keys: &[Value]) -> Result<HashSet<Value>> {
    let mut found = HashSet::new();
    for node in Traverse::new(store, entity, keys) {
        found.extend(store.tags(node?).cloned());
    }
    Ok(found)
}

/// Union of the targets of `tag` along the walk.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_targets(store: &Store, entity: Entity, tag: &Value, keys: &[Value]) -> Result<EntitySet> {
    let mut found = EntitySet::new();
    for node in Traverse::new(store, entity, keys) {
        found.extend(store.relation_targets(node?, tag));
    }
    Ok(found)
}

/// The single target of `tag` on the nearest entity along the walk that
/// has any.
///
/// The entity's own edges are read before the walk moves on, and targets
/// further up are shadowed, so a child can replace the target it would
/// otherwise inherit.
///
/// # Errors
///
/// Returns not-found if no entity along the walk has a target, an ambiguous
/// relation error if the nearest one has several, or a contract violation
/// from the walk itself.
pub fn exclusive_target(store: &Store, entity: Entity, tag: &Value, keys: &[Value]) -> Result<Entity> {
    for node in Traverse::new(store, entity, keys) {
        let node = node?;
        let mut targets = store.relation_targets(node, tag);
        match (targets.next(), targets.next()) {
            (None, _) => {}
            (Some(target), None) => return Ok(target),
            (Some(_), Some(_)) => {
                return Err(Error::ambiguous_relation(
                    node,
                    RelationKey::Tag(tag.clone()),
                    store.relation_target_count(node, tag),
                ));
            }
        }
    }
    Err(Error::relation_target_not_found(entity, RelationKey::Tag(tag.clone())))
}

/// Union of the relation tags used anywhere along the walk.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_relation_tag_keys(store: &Store, entity: Entity, keys: &[Value]) -> Result<HashSet<Value>> {
    let mut found = HashSet::new();
    for node in Traverse::new(store, entity, keys) {
        found.extend(store.relation_tag_keys(node?).cloned());
    }
    Ok(found)
}

/// The first value carried by `origin --key--> target` along the walk.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_relation_component<'a>(
    store: &'a Store,
    origin: Entity,
    key: &ComponentKey,
    target: Entity,
    keys: &[Value],
) -> Result<Option<&'a Value>> {
    for node in Traverse::new(store, origin, keys) {
        if let Some(value) = store.relation_component(node?, key, target) {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Union of the targets of component relation `key` along the walk.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_relation_component_targets(
    store: &Store,
    origin: Entity,
    key: &ComponentKey,
    keys: &[Value],
) -> Result<EntitySet> {
    let mut found = EntitySet::new();
    for node in Traverse::new(store, origin, keys) {
        found.extend(store.relation_component_targets(node?, key).map(|(target, _)| target));
    }
    Ok(found)
}

/// Union of the component relation keys used anywhere along the walk.
///
/// # Errors
///
/// Returns a contract violation if the walk meets an ambiguous traversal key.
pub fn inherited_relation_component_keys(
    store: &Store,
    origin: Entity,
    keys: &[Value],
) -> Result<HashSet<ComponentKey>> {
    let mut found = HashSet::new();
    for node in Traverse::new(store, origin, keys) {
        found.extend(store.relation_component_keys(node?).cloned());
    }
    Ok(found)
}
