//! Component storage with forward and inverse indices.
//!
//! Components are stored twice: per entity for direct access and per key
//! for query intersections. Both copies always change together and empty
//! inner maps are pruned eagerly.

use std::collections::HashMap;

use kindred_foundation::{ComponentKey, Entity, EntitySet, Value};

/// Stores component values for all entities.
#[derive(Clone, Debug, Default)]
pub struct ComponentTable {
    /// Forward index: entity -> key -> value.
    forward: HashMap<Entity, HashMap<ComponentKey, Value>>,
    /// Inverse index: key -> entity -> value.
    inverse: HashMap<ComponentKey, HashMap<Entity, Value>>,
}

impl ComponentTable {
    /// Creates a new empty component table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a component, returning the previous value if there was one.
    pub fn set(&mut self, entity: Entity, key: ComponentKey, value: Value) -> Option<Value> {
        self.inverse
            .entry(key.clone())
            .or_default()
            .insert(entity, value.clone());
        self.forward.entry(entity).or_default().insert(key, value)
    }

    /// Gets a component value.
    #[must_use]
    pub fn get(&self, entity: Entity, key: &ComponentKey) -> Option<&Value> {
        self.forward.get(&entity)?.get(key)
    }

    /// Checks if an entity has a component.
    #[must_use]
    pub fn has(&self, entity: Entity, key: &ComponentKey) -> bool {
        self.get(entity, key).is_some()
    }

    /// Removes a component from an entity.
    ///
    /// Returns the removed value if it existed.
    pub fn remove(&mut self, entity: Entity, key: &ComponentKey) -> Option<Value> {
        let components = self.forward.get_mut(&entity)?;
        let old = components.remove(key)?;
        if components.is_empty() {
            self.forward.remove(&entity);
        }
        if let Some(holders) = self.inverse.get_mut(key) {
            holders.remove(&entity);
            if holders.is_empty() {
                self.inverse.remove(key);
            }
        }
        Some(old)
    }

    /// Iterates the component keys held directly by an entity.
    pub fn keys(&self, entity: Entity) -> impl Iterator<Item = &ComponentKey> + '_ {
        self.forward.get(&entity).into_iter().flat_map(HashMap::keys)
    }

    /// Number of components held directly by an entity.
    #[must_use]
    pub fn count(&self, entity: Entity) -> usize {
        self.forward.get(&entity).map_or(0, HashMap::len)
    }

    /// Entities holding `key`.
    #[must_use]
    pub fn holders(&self, key: &ComponentKey) -> EntitySet {
        self.inverse
            .get(key)
            .map(|holders| holders.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of entities holding `key`.
    #[must_use]
    pub fn holder_count(&self, key: &ComponentKey) -> usize {
        self.inverse.get(key).map_or(0, HashMap::len)
    }

    /// Iterates every entity with at least one component.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.forward.keys().copied()
    }

    /// Checks that the forward and inverse indices mirror each other.
    pub(crate) fn check(&self) -> Result<(), String> {
        for (entity, components) in &self.forward {
            if components.is_empty() {
                return Err(format!("empty component map left for {entity:?}"));
            }
            for (key, value) in components {
                if self.inverse.get(key).and_then(|h| h.get(entity)) != Some(value) {
                    return Err(format!("component {key} of {entity:?} missing from inverse"));
                }
            }
        }
        for (key, holders) in &self.inverse {
            if holders.is_empty() {
                return Err(format!("empty holder map left for {key}"));
            }
            for entity in holders.keys() {
                if !self.has(*entity, key) {
                    return Err(format!("inverse lists {entity:?} for {key} but it is absent"));
                }
            }
        }
        Ok(())
    }
}
