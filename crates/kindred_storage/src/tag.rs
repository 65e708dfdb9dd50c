//! Tag storage with forward and inverse indices.

use std::collections::{HashMap, HashSet};

use kindred_foundation::{Entity, EntitySet, Value};

/// Stores unvalued tags for all entities.
#[derive(Clone, Debug, Default)]
pub struct TagTable {
    /// Forward index: entity -> tags.
    forward: HashMap<Entity, HashSet<Value>>,
    /// Inverse index: tag -> entities.
    inverse: HashMap<Value, EntitySet>,
}

impl TagTable {
    /// Creates a new empty tag table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Returns false if the entity already had it.
    pub fn add(&mut self, entity: Entity, tag: Value) -> bool {
        if !self.forward.entry(entity).or_default().insert(tag.clone()) {
            return false;
        }
        self.inverse.entry(tag).or_default().insert(entity);
        true
    }

    /// Removes a tag. Returns false if the entity did not have it.
    pub fn remove(&mut self, entity: Entity, tag: &Value) -> bool {
        let Some(tags) = self.forward.get_mut(&entity) else {
            return false;
        };
        if !tags.remove(tag) {
            return false;
        }
        if tags.is_empty() {
            self.forward.remove(&entity);
        }
        if let Some(holders) = self.inverse.get_mut(tag) {
            holders.remove(&entity);
            if holders.is_empty() {
                self.inverse.remove(tag);
            }
        }
        true
    }

    /// Checks if an entity has a tag.
    #[must_use]
    pub fn has(&self, entity: Entity, tag: &Value) -> bool {
        self.forward.get(&entity).is_some_and(|tags| tags.contains(tag))
    }

    /// Iterates the tags held directly by an entity.
    pub fn tags(&self, entity: Entity) -> impl Iterator<Item = &Value> + '_ {
        self.forward.get(&entity).into_iter().flatten()
    }

    /// Number of tags held directly by an entity.
    #[must_use]
    pub fn count(&self, entity: Entity) -> usize {
        self.forward.get(&entity).map_or(0, HashSet::len)
    }

    /// Entities holding `tag`.
    #[must_use]
    pub fn holders(&self, tag: &Value) -> EntitySet {
        self.inverse.get(tag).cloned().unwrap_or_default()
    }

    /// Iterates every entity with at least one tag.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.forward.keys().copied()
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for (entity, tags) in &self.forward {
            if tags.is_empty() {
                return Err(format!("empty tag set left for {entity:?}"));
            }
            for tag in tags {
                if !self.inverse.get(tag).is_some_and(|h| h.contains(entity)) {
                    return Err(format!("tag {tag:?} of {entity:?} missing from inverse"));
                }
            }
        }
        for (tag, holders) in &self.inverse {
            if holders.is_empty() {
                return Err(format!("empty holder set left for tag {tag:?}"));
            }
            for entity in holders {
                if !self.has(*entity, tag) {
                    return Err(format!("inverse lists {entity:?} for tag {tag:?} but it is absent"));
                }
            }
        }
        Ok(())
    }
}
