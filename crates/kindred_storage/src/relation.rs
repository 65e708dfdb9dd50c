//! Relation storage.
//!
//! Relations are directed edges `origin --key--> target`. Tag relations carry
//! nothing but the edge; component relations carry one value per target.
//! Every edge is also indexed in the [`RelationLookup`], which this table
//! keeps in step with its own maps.

use std::collections::{HashMap, HashSet};

use kindred_foundation::{ComponentKey, Entity, RelationKey, Value};

use crate::lookup::{LookupKey, RelationLookup};

/// Stores relation tag and relation component edges.
#[derive(Clone, Debug, Default)]
pub struct RelationTable {
    /// Tag relations: origin -> tag -> targets.
    tags: HashMap<Entity, HashMap<Value, HashSet<Entity>>>,
    /// Component relations: origin -> key -> target -> value.
    components: HashMap<Entity, HashMap<ComponentKey, HashMap<Entity, Value>>>,
    /// Derived four-shape index over both tables.
    lookup: RelationLookup,
}

impl RelationTable {
    /// Creates a new empty relation table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The derived lookup index.
    #[must_use]
    pub const fn lookup(&self) -> &RelationLookup {
        &self.lookup
    }

    // ------------------------------------------------------------------
    // Tag relations
    // ------------------------------------------------------------------

    /// Adds a tag edge. Returns the lookup keys of the edge, empty if the
    /// edge already existed.
    pub fn add_tag(&mut self, origin: Entity, tag: Value, target: Entity) -> Vec<LookupKey> {
        let targets = self
            .tags
            .entry(origin)
            .or_default()
            .entry(tag.clone())
            .or_default();
        if !targets.insert(target) {
            return Vec::new();
        }
        let key = RelationKey::Tag(tag);
        self.lookup.insert(origin, &key, target);
        RelationLookup::fan_out(origin, &key, target).to_vec()
    }

    /// Removes a tag edge. Returns the lookup keys of the edge, empty if the
    /// edge did not exist.
    pub fn remove_tag(&mut self, origin: Entity, tag: &Value, target: Entity) -> Vec<LookupKey> {
        let Some(by_tag) = self.tags.get_mut(&origin) else {
            return Vec::new();
        };
        let Some(targets) = by_tag.get_mut(tag) else {
            return Vec::new();
        };
        if !targets.remove(&target) {
            return Vec::new();
        }
        if targets.is_empty() {
            by_tag.remove(tag);
            if by_tag.is_empty() {
                self.tags.remove(&origin);
            }
        }
        let key = RelationKey::Tag(tag.clone());
        self.lookup.remove(origin, &key, target);
        RelationLookup::fan_out(origin, &key, target).to_vec()
    }

    /// Checks for a tag edge.
    #[must_use]
    pub fn has_tag(&self, origin: Entity, tag: &Value, target: Entity) -> bool {
        self.tags
            .get(&origin)
            .and_then(|by_tag| by_tag.get(tag))
            .is_some_and(|targets| targets.contains(&target))
    }

    /// Iterates the direct targets of `origin` via `tag`.
    pub fn tag_targets(&self, origin: Entity, tag: &Value) -> impl Iterator<Item = Entity> + '_ {
        self.tags
            .get(&origin)
            .and_then(|by_tag| by_tag.get(tag))
            .into_iter()
            .flatten()
            .copied()
    }

    /// Number of direct targets of `origin` via `tag`.
    #[must_use]
    pub fn tag_target_count(&self, origin: Entity, tag: &Value) -> usize {
        self.tags
            .get(&origin)
            .and_then(|by_tag| by_tag.get(tag))
            .map_or(0, HashSet::len)
    }

    /// Iterates the relation tags used directly by `origin`.
    pub fn tag_keys(&self, origin: Entity) -> impl Iterator<Item = &Value> + '_ {
        self.tags.get(&origin).into_iter().flat_map(HashMap::keys)
    }

    // ------------------------------------------------------------------
    // Component relations
    // ------------------------------------------------------------------

    /// Sets the value carried by an edge, creating the edge if needed.
    ///
    /// Returns the previous value and, for a new edge, its lookup keys.
    pub fn set_component(
        &mut self,
        origin: Entity,
        key: ComponentKey,
        target: Entity,
        value: Value,
    ) -> (Option<Value>, Vec<LookupKey>) {
        let old = self
            .components
            .entry(origin)
            .or_default()
            .entry(key.clone())
            .or_default()
            .insert(target, value);
        if old.is_some() {
            return (old, Vec::new());
        }
        let key = RelationKey::Component(key);
        self.lookup.insert(origin, &key, target);
        (None, RelationLookup::fan_out(origin, &key, target).to_vec())
    }

    /// Gets the value carried by an edge.
    #[must_use]
    pub fn component(&self, origin: Entity, key: &ComponentKey, target: Entity) -> Option<&Value> {
        self.components.get(&origin)?.get(key)?.get(&target)
    }

    /// Removes a component edge.
    ///
    /// Returns the removed value and the lookup keys of the edge.
    pub fn remove_component(
        &mut self,
        origin: Entity,
        key: &ComponentKey,
        target: Entity,
    ) -> Option<(Value, Vec<LookupKey>)> {
        let by_key = self.components.get_mut(&origin)?;
        let targets = by_key.get_mut(key)?;
        let old = targets.remove(&target)?;
        if targets.is_empty() {
            by_key.remove(key);
            if by_key.is_empty() {
                self.components.remove(&origin);
            }
        }
        let key = RelationKey::Component(key.clone());
        self.lookup.remove(origin, &key, target);
        Some((old, RelationLookup::fan_out(origin, &key, target).to_vec()))
    }

    /// Iterates `(target, value)` for the component edges of `origin` via `key`.
    pub fn component_targets(
        &self,
        origin: Entity,
        key: &ComponentKey,
    ) -> impl Iterator<Item = (Entity, &Value)> + '_ {
        self.components
            .get(&origin)
            .and_then(|by_key| by_key.get(key))
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(target, value)| (*target, value)))
    }

    /// Iterates the component relation keys used directly by `origin`.
    pub fn component_keys(&self, origin: Entity) -> impl Iterator<Item = &ComponentKey> + '_ {
        self.components.get(&origin).into_iter().flat_map(HashMap::keys)
    }

    // ------------------------------------------------------------------
    // Whole-table access
    // ------------------------------------------------------------------

    /// Iterates every origin with at least one outgoing edge.
    pub fn origins(&self) -> impl Iterator<Item = Entity> + '_ {
        self.tags.keys().chain(self.components.keys()).copied()
    }

    /// Iterates every edge of both tables.
    pub fn edges(&self) -> impl Iterator<Item = (Entity, RelationKey, Entity)> + '_ {
        let tag_edges = self.tags.iter().flat_map(|(origin, by_tag)| {
            by_tag.iter().flat_map(move |(tag, targets)| {
                targets
                    .iter()
                    .map(move |target| (*origin, RelationKey::Tag(tag.clone()), *target))
            })
        });
        let component_edges = self.components.iter().flat_map(|(origin, by_key)| {
            by_key.iter().flat_map(move |(key, targets)| {
                targets
                    .keys()
                    .map(move |target| (*origin, RelationKey::Component(key.clone()), *target))
            })
        });
        tag_edges.chain(component_edges)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for (origin, by_tag) in &self.tags {
            if by_tag.is_empty() || by_tag.values().any(HashSet::is_empty) {
                return Err(format!("empty relation tag container left for {origin:?}"));
            }
        }
        for (origin, by_key) in &self.components {
            if by_key.is_empty() || by_key.values().any(HashMap::is_empty) {
                return Err(format!("empty relation component container left for {origin:?}"));
            }
        }
        if self.lookup != RelationLookup::from_edges(self.edges()) {
            return Err("relation lookup differs from a rebuild of the relation tables".into());
        }
        Ok(())
    }
}
