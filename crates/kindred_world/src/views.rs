//! Read-only views of one entity's data.
//!
//! Every view resolves through inheritance with the World's default
//! traversal keys. `traverse` swaps in other keys and `direct` turns
//! inheritance off, so only the entity's own data is seen.

use std::collections::HashSet;

use kindred_foundation::{ComponentKey, Entity, EntitySet, Error, Result, Value};
use kindred_storage::traversal;

use crate::world::World;

/// Components of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Components<'w> {
    world: &'w World,
    entity: Entity,
    keys: &'w [Value],
}

impl<'w> Components<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self {
            world,
            entity,
            keys: &world.config().default_traversal,
        }
    }

    /// Resolves through `keys` instead of the default traversal.
    #[must_use]
    pub const fn traverse(self, keys: &'w [Value]) -> Self {
        Self { keys, ..self }
    }

    /// Resolves without inheritance.
    #[must_use]
    pub const fn direct(self) -> Self {
        self.traverse(&[])
    }

    /// Gets a component.
    ///
    /// # Errors
    ///
    /// Returns not-found if neither the entity nor any ancestor holds `key`.
    pub fn get(&self, key: &ComponentKey) -> Result<&'w Value> {
        self.find(key)?
            .ok_or_else(|| Error::component_not_found(self.entity, key.clone()))
    }

    /// Gets a component if present.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn find(&self, key: &ComponentKey) -> Result<Option<&'w Value>> {
        let found = traversal::inherited_component(self.world.store(), self.entity, key, self.keys)?;
        Ok(found.map(|(_, value)| value))
    }

    /// Checks for a component.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn contains(&self, key: &ComponentKey) -> Result<bool> {
        Ok(self.find(key)?.is_some())
    }

    /// The entity that provides `key`: the entity itself or an ancestor.
    ///
    /// # Errors
    ///
    /// Returns not-found if no one provides `key`.
    pub fn owner(&self, key: &ComponentKey) -> Result<Entity> {
        traversal::inherited_component(self.world.store(), self.entity, key, self.keys)?
            .map(|(owner, _)| owner)
            .ok_or_else(|| Error::component_not_found(self.entity, key.clone()))
    }

    /// Every component key visible on the entity.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn keys(&self) -> Result<HashSet<ComponentKey>> {
        traversal::inherited_component_keys(self.world.store(), self.entity, self.keys)
    }
}

/// Tags of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Tags<'w> {
    world: &'w World,
    entity: Entity,
    keys: &'w [Value],
}

impl<'w> Tags<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self {
            world,
            entity,
            keys: &world.config().default_traversal,
        }
    }

    /// Resolves through `keys` instead of the default traversal.
    #[must_use]
    pub const fn traverse(self, keys: &'w [Value]) -> Self {
        Self { keys, ..self }
    }

    /// Resolves without inheritance.
    #[must_use]
    pub const fn direct(self) -> Self {
        self.traverse(&[])
    }

    /// Checks for a tag.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn contains(&self, tag: &Value) -> Result<bool> {
        traversal::has_inherited_tag(self.world.store(), self.entity, tag, self.keys)
    }

    /// Every tag visible on the entity.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn all(&self) -> Result<HashSet<Value>> {
        traversal::inherited_tags(self.world.store(), self.entity, self.keys)
    }
}

/// Relation tags of an entity.
#[derive(Clone, Copy, Debug)]
pub struct RelationTags<'w> {
    world: &'w World,
    entity: Entity,
    keys: &'w [Value],
}

impl<'w> RelationTags<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self {
            world,
            entity,
            keys: &world.config().default_traversal,
        }
    }

    /// Resolves through `keys` instead of the default traversal.
    #[must_use]
    pub const fn traverse(self, keys: &'w [Value]) -> Self {
        Self { keys, ..self }
    }

    /// Resolves without inheritance.
    #[must_use]
    pub const fn direct(self) -> Self {
        self.traverse(&[])
    }

    /// The single target of `tag`.
    ///
    /// # Errors
    ///
    /// Returns not-found if there is no target and an ambiguous relation
    /// error if there are several.
    pub fn target(&self, tag: &Value) -> Result<Entity> {
        traversal::exclusive_target(self.world.store(), self.entity, tag, self.keys)
    }

    /// Every target of `tag`.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn targets(&self, tag: &Value) -> Result<EntitySet> {
        traversal::inherited_targets(self.world.store(), self.entity, tag, self.keys)
    }

    /// Checks for an edge to `target`.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn contains(&self, tag: &Value, target: Entity) -> Result<bool> {
        Ok(self.targets(tag)?.contains(&target))
    }

    /// Every relation tag the entity uses.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn keys(&self) -> Result<HashSet<Value>> {
        traversal::inherited_relation_tag_keys(self.world.store(), self.entity, self.keys)
    }
}

/// Components carried by an entity's relations.
#[derive(Clone, Copy, Debug)]
pub struct RelationComponents<'w> {
    world: &'w World,
    entity: Entity,
    keys: &'w [Value],
}

impl<'w> RelationComponents<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self {
            world,
            entity,
            keys: &world.config().default_traversal,
        }
    }

    /// Resolves through `keys` instead of the default traversal.
    #[must_use]
    pub const fn traverse(self, keys: &'w [Value]) -> Self {
        Self { keys, ..self }
    }

    /// Resolves without inheritance.
    #[must_use]
    pub const fn direct(self) -> Self {
        self.traverse(&[])
    }

    /// Gets the value carried to `target` via `key`.
    ///
    /// # Errors
    ///
    /// Returns not-found if no such edge is visible.
    pub fn get(&self, key: &ComponentKey, target: Entity) -> Result<&'w Value> {
        traversal::inherited_relation_component(self.world.store(), self.entity, key, target, self.keys)?
            .ok_or_else(|| Error::relation_component_not_found(self.entity, key.clone(), target))
    }

    /// Every target reached via `key`.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn targets(&self, key: &ComponentKey) -> Result<EntitySet> {
        traversal::inherited_relation_component_targets(self.world.store(), self.entity, key, self.keys)
    }

    /// Every `(target, value)` pair for `key`, ordered by target.
    ///
    /// When several ancestors carry an edge to the same target, the nearest
    /// one wins.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn entries(&self, key: &ComponentKey) -> Result<Vec<(Entity, &'w Value)>> {
        let mut targets: Vec<Entity> = self.targets(key)?.into_iter().collect();
        targets.sort();
        targets
            .into_iter()
            .map(|target| Ok((target, self.get(key, target)?)))
            .collect()
    }

    /// Every component relation key the entity uses.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if inheritance is ambiguous.
    pub fn keys(&self) -> Result<HashSet<ComponentKey>> {
        traversal::inherited_relation_component_keys(self.world.store(), self.entity, self.keys)
    }
}
