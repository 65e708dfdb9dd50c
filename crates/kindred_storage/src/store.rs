//! The dual-indexed table set of one World.
//!
//! [`Store`] composes the component, tag and relation tables. Every mutation
//! goes through it. A mutation that adds or removes a component, tag or
//! relation edge records the [`Atom`]s it may have changed; overwriting a
//! value or repeating an add records nothing. Whoever caches data derived
//! from the store drains the journal with [`Store::take_touched`] before the
//! mutating call returns to its own caller.

use std::collections::HashSet;

use kindred_foundation::{ComponentKey, Entity, EntitySet, Error, Result, Value};
use tracing::trace;

use crate::component::ComponentTable;
use crate::lookup::{LookupKey, RelationLookup};
use crate::relation::RelationTable;
use crate::tag::TagTable;

/// One indexed set a mutation can change.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Atom {
    /// The holders of a component key.
    Component(ComponentKey),
    /// The holders of a tag.
    Tag(Value),
    /// One relation lookup set.
    Relation(LookupKey),
}

/// All entity data of one World.
#[derive(Clone, Debug, Default)]
pub struct Store {
    components: ComponentTable,
    tags: TagTable,
    relations: RelationTable,
    touched: Vec<Atom>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the atoms touched since the last call.
    pub fn take_touched(&mut self) -> Vec<Atom> {
        std::mem::take(&mut self.touched)
    }

    fn touch_relations(&mut self, keys: Vec<LookupKey>) {
        self.touched.extend(keys.into_iter().map(Atom::Relation));
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Sets a component, returning the previous value.
    ///
    /// Only an insertion touches the key; overwriting leaves membership alone.
    pub fn set_component(&mut self, entity: Entity, key: ComponentKey, value: Value) -> Option<Value> {
        let old = self.components.set(entity, key.clone(), value);
        if old.is_none() {
            trace!(?entity, %key, "component added");
            self.touched.push(Atom::Component(key));
        }
        old
    }

    /// Gets a component held directly by `entity`.
    #[must_use]
    pub fn component(&self, entity: Entity, key: &ComponentKey) -> Option<&Value> {
        self.components.get(entity, key)
    }

    /// Removes a component, returning its value.
    pub fn remove_component(&mut self, entity: Entity, key: &ComponentKey) -> Option<Value> {
        let old = self.components.remove(entity, key)?;
        trace!(?entity, %key, "component removed");
        self.touched.push(Atom::Component(key.clone()));
        Some(old)
    }

    /// Iterates the component keys held directly by `entity`.
    pub fn component_keys(&self, entity: Entity) -> impl Iterator<Item = &ComponentKey> + '_ {
        self.components.keys(entity)
    }

    /// Entities holding `key` directly.
    #[must_use]
    pub fn component_holders(&self, key: &ComponentKey) -> EntitySet {
        self.components.holders(key)
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Adds a tag. Returns false, touching nothing, if it was already present.
    pub fn add_tag(&mut self, entity: Entity, tag: Value) -> bool {
        if !self.tags.add(entity, tag.clone()) {
            return false;
        }
        self.touched.push(Atom::Tag(tag));
        true
    }

    /// Removes a tag. Returns false, touching nothing, if it was absent.
    pub fn remove_tag(&mut self, entity: Entity, tag: &Value) -> bool {
        if !self.tags.remove(entity, tag) {
            return false;
        }
        self.touched.push(Atom::Tag(tag.clone()));
        true
    }

    /// Checks for a tag held directly by `entity`.
    #[must_use]
    pub fn has_tag(&self, entity: Entity, tag: &Value) -> bool {
        self.tags.has(entity, tag)
    }

    /// Iterates the tags held directly by `entity`.
    pub fn tags(&self, entity: Entity) -> impl Iterator<Item = &Value> + '_ {
        self.tags.tags(entity)
    }

    /// Entities holding `tag` directly.
    #[must_use]
    pub fn tag_holders(&self, tag: &Value) -> EntitySet {
        self.tags.holders(tag)
    }

    // ------------------------------------------------------------------
    // Relation tags
    // ------------------------------------------------------------------

    /// Adds a relation tag edge. Returns false if it already existed.
    pub fn add_relation_tag(&mut self, origin: Entity, tag: Value, target: Entity) -> bool {
        let changed = self.relations.add_tag(origin, tag, target);
        let added = !changed.is_empty();
        self.touch_relations(changed);
        added
    }

    /// Removes a relation tag edge. Returns false if it did not exist.
    pub fn remove_relation_tag(&mut self, origin: Entity, tag: &Value, target: Entity) -> bool {
        let changed = self.relations.remove_tag(origin, tag, target);
        let removed = !changed.is_empty();
        self.touch_relations(changed);
        removed
    }

    /// Checks for a relation tag edge.
    #[must_use]
    pub fn has_relation_tag(&self, origin: Entity, tag: &Value, target: Entity) -> bool {
        self.relations.has_tag(origin, tag, target)
    }

    /// Iterates the direct targets of `origin` via `tag`.
    pub fn relation_targets(&self, origin: Entity, tag: &Value) -> impl Iterator<Item = Entity> + '_ {
        self.relations.tag_targets(origin, tag)
    }

    /// Number of direct targets of `origin` via `tag`.
    #[must_use]
    pub fn relation_target_count(&self, origin: Entity, tag: &Value) -> usize {
        self.relations.tag_target_count(origin, tag)
    }

    /// Iterates the relation tags used directly by `origin`.
    pub fn relation_tag_keys(&self, origin: Entity) -> impl Iterator<Item = &Value> + '_ {
        self.relations.tag_keys(origin)
    }

    // ------------------------------------------------------------------
    // Relation components
    // ------------------------------------------------------------------

    /// Sets the value carried by an edge, returning the previous value.
    pub fn set_relation_component(
        &mut self,
        origin: Entity,
        key: ComponentKey,
        target: Entity,
        value: Value,
    ) -> Option<Value> {
        let (old, changed) = self.relations.set_component(origin, key, target, value);
        self.touch_relations(changed);
        old
    }

    /// Gets the value carried by an edge.
    #[must_use]
    pub fn relation_component(&self, origin: Entity, key: &ComponentKey, target: Entity) -> Option<&Value> {
        self.relations.component(origin, key, target)
    }

    /// Removes a component edge, returning its value.
    pub fn remove_relation_component(
        &mut self,
        origin: Entity,
        key: &ComponentKey,
        target: Entity,
    ) -> Option<Value> {
        let (old, changed) = self.relations.remove_component(origin, key, target)?;
        self.touch_relations(changed);
        Some(old)
    }

    /// Iterates `(target, value)` for the component edges of `origin` via `key`.
    pub fn relation_component_targets(
        &self,
        origin: Entity,
        key: &ComponentKey,
    ) -> impl Iterator<Item = (Entity, &Value)> + '_ {
        self.relations.component_targets(origin, key)
    }

    /// Iterates the component relation keys used directly by `origin`.
    pub fn relation_component_keys(&self, origin: Entity) -> impl Iterator<Item = &ComponentKey> + '_ {
        self.relations.component_keys(origin)
    }

    // ------------------------------------------------------------------
    // Whole-entity operations
    // ------------------------------------------------------------------

    /// The relation lookup index.
    #[must_use]
    pub const fn lookup(&self) -> &RelationLookup {
        self.relations.lookup()
    }

    /// Removes everything `entity` holds directly.
    ///
    /// Relations pointing at `entity` from other entities are left alone.
    /// Returns the removed components so callers can report them.
    pub fn clear(&mut self, entity: Entity) -> Vec<(ComponentKey, Value)> {
        let keys: Vec<ComponentKey> = self.components.keys(entity).cloned().collect();
        let removed = keys
            .into_iter()
            .filter_map(|key| {
                let value = self.remove_component(entity, &key)?;
                Some((key, value))
            })
            .collect();

        let tags: Vec<Value> = self.tags.tags(entity).cloned().collect();
        for tag in tags {
            self.remove_tag(entity, &tag);
        }

        let edges: Vec<(Value, Entity)> = self
            .relations
            .tag_keys(entity)
            .flat_map(|tag| self.relations.tag_targets(entity, tag).map(move |t| (tag.clone(), t)))
            .collect();
        for (tag, target) in edges {
            self.remove_relation_tag(entity, &tag, target);
        }

        let edges: Vec<(ComponentKey, Entity)> = self
            .relations
            .component_keys(entity)
            .flat_map(|key| {
                self.relations
                    .component_targets(entity, key)
                    .map(move |(t, _)| (key.clone(), t))
            })
            .collect();
        for (key, target) in edges {
            self.remove_relation_component(entity, &key, target);
        }

        removed
    }

    /// Returns true if `entity` holds nothing directly.
    #[must_use]
    pub fn is_empty_entity(&self, entity: Entity) -> bool {
        self.components.count(entity) == 0
            && self.tags.count(entity) == 0
            && self.relations.tag_keys(entity).next().is_none()
            && self.relations.component_keys(entity).next().is_none()
    }

    /// Every entity holding at least one component, tag, or outgoing relation.
    #[must_use]
    pub fn entities(&self) -> HashSet<Entity> {
        self.components
            .entities()
            .chain(self.tags.entities())
            .chain(self.relations.origins())
            .collect()
    }

    /// Checks every table invariant.
    ///
    /// # Errors
    ///
    /// Returns a contract violation describing the first inconsistency: a
    /// forward entry without its inverse entry (or the reverse), an empty
    /// container left behind, or a relation lookup that differs from one
    /// rebuilt from the relation tables.
    pub fn validate(&self) -> Result<()> {
        self.components
            .check()
            .and_then(|()| self.tags.check())
            .and_then(|()| self.relations.check())
            .map_err(Error::contract_violation)
    }
}
