//! The World: entities, their data, and queries over them.
//!
//! A [`World`] owns one [`Store`], the identity table that issues its entity
//! handles, a query cache, and its change hooks. Every mutation runs to
//! completion before returning: tables are updated, cached queries that read
//! a touched atom are dropped, and hooks are run.
//!
//! Reads resolve through inheritance with the configured traversal keys.
//! Removals act on the entity's own data only, so removing an inherited
//! component is a not-found error.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use kindred_foundation::{ComponentKey, Entity, EntitySet, Error, Result, Value, WorldId};
use kindred_query::{CacheStats, Filter, Query, QueryCache};
use kindred_storage::{Identities, Store, UidTable};
use tracing::debug;

use crate::config::WorldConfig;
use crate::hooks::{ChangeHooks, HookId};
use crate::views::{Components, RelationComponents, RelationTags, Tags};

/// An entity-component-relation store with cached queries.
pub struct World {
    id: WorldId,
    store: Store,
    cache: RefCell<QueryCache>,
    identities: Box<dyn Identities>,
    hooks: ChangeHooks,
    config: WorldConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty World with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty World.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self::with_identities(Box::new(UidTable::new(WorldId::fresh())), config)
    }

    /// Creates an empty World whose handles are issued by `identities`.
    #[must_use]
    pub fn with_identities(identities: Box<dyn Identities>, config: WorldConfig) -> Self {
        let cache = if config.cache_queries {
            QueryCache::new()
        } else {
            QueryCache::disabled()
        };
        let id = identities.world();
        debug!(world = ?id, "world created");
        Self {
            id,
            store: Store::new(),
            cache: RefCell::new(cache),
            identities,
            hooks: ChangeHooks::new(),
            config,
        }
    }

    /// The id stamped on every handle this World issues.
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The underlying tables.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    fn check(&self, entity: Entity) -> Result<()> {
        if entity.world() == self.id {
            Ok(())
        } else {
            Err(Error::foreign_entity(entity, self.id))
        }
    }

    /// Drops cached queries that read anything the last mutation touched.
    fn sync_cache(&mut self) {
        let cache = self.cache.get_mut();
        for atom in self.store.take_touched() {
            cache.touch(&atom);
        }
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Creates an entity no uid can name.
    pub fn new_entity(&mut self) -> Entity {
        self.identities.resolve_fresh()
    }

    /// Creates an entity with initial components and tags.
    pub fn spawn(
        &mut self,
        components: impl IntoIterator<Item = (ComponentKey, Value)>,
        tags: impl IntoIterator<Item = Value>,
    ) -> Entity {
        let entity = self.new_entity();
        for (key, value) in components {
            self.write_component(entity, key, value);
        }
        for tag in tags {
            self.store.add_tag(entity, tag);
        }
        self.sync_cache();
        entity
    }

    /// Returns the entity for `uid`, creating it on first use.
    pub fn entity(&mut self, uid: impl Into<Value>) -> Entity {
        self.identities.resolve(uid.into())
    }

    /// Returns the entity for `uid` without creating it.
    ///
    /// # Errors
    ///
    /// Returns not-found if no entity was ever created for `uid`.
    pub fn lookup(&self, uid: &Value) -> Result<Entity> {
        self.identities
            .lookup(uid)
            .ok_or_else(|| Error::uid_not_found(uid.clone()))
    }

    /// The uid `entity` was created from.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn uid(&self, entity: Entity) -> Result<&Value> {
        self.check(entity)?;
        self.identities
            .uid(entity)
            .ok_or_else(|| Error::foreign_entity(entity, self.id))
    }

    /// Number of entities issued so far.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.identities.len()
    }

    /// Every entity holding some data or outgoing relation.
    #[must_use]
    pub fn entities(&self) -> HashSet<Entity> {
        self.store.entities()
    }

    /// Removes everything `entity` holds directly.
    ///
    /// Relations other entities have to `entity` are kept.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn clear(&mut self, entity: Entity) -> Result<()> {
        self.check(entity)?;
        let removed = self.store.clear(entity);
        self.sync_cache();
        for (key, old) in removed {
            self.hooks.notify(&key, entity, Some(&old), None);
        }
        Ok(())
    }

    /// Creates an entity that inherits from `parent` through `is-a`.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `parent`.
    pub fn instantiate(&mut self, parent: Entity) -> Result<Entity> {
        self.check(parent)?;
        let child = self.new_entity();
        self.store.add_relation_tag(child, Value::is_a(), parent);
        self.sync_cache();
        Ok(child)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Read view of an entity's components.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn components(&self, entity: Entity) -> Result<Components<'_>> {
        self.check(entity)?;
        Ok(Components::new(self, entity))
    }

    /// Read view of an entity's tags.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn tags(&self, entity: Entity) -> Result<Tags<'_>> {
        self.check(entity)?;
        Ok(Tags::new(self, entity))
    }

    /// Read view of an entity's relation tags.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn relation_tags(&self, entity: Entity) -> Result<RelationTags<'_>> {
        self.check(entity)?;
        Ok(RelationTags::new(self, entity))
    }

    /// Read view of the components an entity's relations carry.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn relation_components(&self, entity: Entity) -> Result<RelationComponents<'_>> {
        self.check(entity)?;
        Ok(RelationComponents::new(self, entity))
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    fn write_component(&mut self, entity: Entity, key: ComponentKey, value: Value) -> Option<Value> {
        let old = self.store.set_component(entity, key.clone(), value.clone());
        self.sync_cache();
        self.hooks.notify(&key, entity, old.as_ref(), Some(&value));
        old
    }

    /// Sets a component, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn set_component(
        &mut self,
        entity: Entity,
        key: impl Into<ComponentKey>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.check(entity)?;
        Ok(self.write_component(entity, key.into(), value.into()))
    }

    /// Gets a component, inherited or held directly.
    ///
    /// # Errors
    ///
    /// Returns not-found if no one provides `key`.
    pub fn get(&self, entity: Entity, key: &ComponentKey) -> Result<&Value> {
        self.components(entity)?.get(key)
    }

    /// Gets a component if present.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error or a contract violation from
    /// inheritance.
    pub fn find(&self, entity: Entity, key: &ComponentKey) -> Result<Option<&Value>> {
        self.components(entity)?.find(key)
    }

    /// Gets a component, or `default` if no one provides it.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error or a contract violation from
    /// inheritance.
    pub fn get_or(&self, entity: Entity, key: &ComponentKey, default: Value) -> Result<Value> {
        Ok(self.find(entity, key)?.cloned().unwrap_or(default))
    }

    /// Checks for a component, inherited or held directly.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error or a contract violation from
    /// inheritance.
    pub fn has_component(&self, entity: Entity, key: &ComponentKey) -> Result<bool> {
        self.components(entity)?.contains(key)
    }

    /// The entity providing `key` to `entity`.
    ///
    /// # Errors
    ///
    /// Returns not-found if no one provides `key`.
    pub fn owner(&self, entity: Entity, key: &ComponentKey) -> Result<Entity> {
        self.components(entity)?.owner(key)
    }

    /// Removes a component held directly, returning its value.
    ///
    /// # Errors
    ///
    /// Returns not-found if `entity` does not hold `key` itself.
    pub fn remove_component(&mut self, entity: Entity, key: &ComponentKey) -> Result<Value> {
        self.take_component(entity, key)?
            .ok_or_else(|| Error::component_not_found(entity, key.clone()))
    }

    /// Removes a component held directly, if there is one.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn take_component(&mut self, entity: Entity, key: &ComponentKey) -> Result<Option<Value>> {
        self.check(entity)?;
        let Some(old) = self.store.remove_component(entity, key) else {
            return Ok(None);
        };
        self.sync_cache();
        self.hooks.notify(key, entity, Some(&old), None);
        Ok(Some(old))
    }

    /// Returns the visible value of `key`, setting it to `default` first if
    /// there is none.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error or a contract violation from
    /// inheritance.
    pub fn set_default(&mut self, entity: Entity, key: ComponentKey, default: Value) -> Result<Value> {
        if let Some(value) = self.find(entity, &key)? {
            return Ok(value.clone());
        }
        self.write_component(entity, key, default.clone());
        Ok(default)
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Adds a tag. Returns false if the entity already held it.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn add_tag(&mut self, entity: Entity, tag: impl Into<Value>) -> Result<bool> {
        self.check(entity)?;
        let added = self.store.add_tag(entity, tag.into());
        self.sync_cache();
        Ok(added)
    }

    /// Removes a tag if held directly. Returns false if it was not.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn discard_tag(&mut self, entity: Entity, tag: &Value) -> Result<bool> {
        self.check(entity)?;
        let removed = self.store.remove_tag(entity, tag);
        self.sync_cache();
        Ok(removed)
    }

    /// Removes a tag held directly.
    ///
    /// # Errors
    ///
    /// Returns not-found if `entity` does not hold `tag` itself.
    pub fn remove_tag(&mut self, entity: Entity, tag: &Value) -> Result<()> {
        if self.discard_tag(entity, tag)? {
            Ok(())
        } else {
            Err(Error::tag_not_found(entity, tag.clone()))
        }
    }

    /// Checks for a tag, inherited or held directly.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error or a contract violation from
    /// inheritance.
    pub fn has_tag(&self, entity: Entity, tag: &Value) -> Result<bool> {
        self.tags(entity)?.contains(tag)
    }

    /// Removes every tag held directly.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `entity`.
    pub fn clear_tags(&mut self, entity: Entity) -> Result<()> {
        self.check(entity)?;
        let tags: Vec<Value> = self.store.tags(entity).cloned().collect();
        for tag in &tags {
            self.store.remove_tag(entity, tag);
        }
        self.sync_cache();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Relation tags
    // ------------------------------------------------------------------

    fn check_edge(&self, origin: Entity, target: Entity) -> Result<()> {
        self.check(origin)?;
        self.check(target)
    }

    /// Makes `target` the only direct target of `tag`.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if either entity is from another World.
    pub fn set_relation_tag(&mut self, origin: Entity, tag: impl Into<Value>, target: Entity) -> Result<()> {
        self.set_relation_targets(origin, tag, [target])
    }

    /// The single target of `tag`, inherited or direct.
    ///
    /// # Errors
    ///
    /// Returns not-found if there is no target and an ambiguous relation
    /// error if there are several.
    pub fn target(&self, origin: Entity, tag: &Value) -> Result<Entity> {
        self.relation_tags(origin)?.target(tag)
    }

    /// Every target of `tag`, inherited or direct.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error or a contract violation from
    /// inheritance.
    pub fn targets(&self, origin: Entity, tag: &Value) -> Result<EntitySet> {
        self.relation_tags(origin)?.targets(tag)
    }

    /// Adds an edge. Returns false if it already existed.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if either entity is from another World.
    pub fn add_relation_tag(&mut self, origin: Entity, tag: impl Into<Value>, target: Entity) -> Result<bool> {
        self.check_edge(origin, target)?;
        let added = self.store.add_relation_tag(origin, tag.into(), target);
        self.sync_cache();
        Ok(added)
    }

    /// Removes a direct edge if present. Returns false if it was not.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if either entity is from another World.
    pub fn discard_relation_tag(&mut self, origin: Entity, tag: &Value, target: Entity) -> Result<bool> {
        self.check_edge(origin, target)?;
        let removed = self.store.remove_relation_tag(origin, tag, target);
        self.sync_cache();
        Ok(removed)
    }

    /// Removes a direct edge.
    ///
    /// # Errors
    ///
    /// Returns not-found if the edge does not exist.
    pub fn remove_relation_tag(&mut self, origin: Entity, tag: &Value, target: Entity) -> Result<()> {
        if self.discard_relation_tag(origin, tag, target)? {
            Ok(())
        } else {
            Err(Error::relation_target_not_found(origin, tag.clone().into()))
        }
    }

    /// Replaces the direct targets of `tag`.
    ///
    /// Edges kept by the new set are not touched.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if any entity is from another World.
    pub fn set_relation_targets(
        &mut self,
        origin: Entity,
        tag: impl Into<Value>,
        targets: impl IntoIterator<Item = Entity>,
    ) -> Result<()> {
        self.check(origin)?;
        let tag = tag.into();
        let wanted: HashSet<Entity> = targets.into_iter().collect();
        for target in &wanted {
            self.check(*target)?;
        }
        let stale: Vec<Entity> = self
            .store
            .relation_targets(origin, &tag)
            .filter(|target| !wanted.contains(target))
            .collect();
        for target in stale {
            self.store.remove_relation_tag(origin, &tag, target);
        }
        for target in wanted {
            self.store.add_relation_tag(origin, tag.clone(), target);
        }
        self.sync_cache();
        Ok(())
    }

    /// Removes every direct edge via `tag`.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `origin`.
    pub fn clear_relation_tag(&mut self, origin: Entity, tag: &Value) -> Result<()> {
        self.set_relation_targets(origin, tag.clone(), [])
    }

    // ------------------------------------------------------------------
    // Relation components
    // ------------------------------------------------------------------

    /// Sets the value carried to `target` via `key`, returning the value it
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if either entity is from another World.
    pub fn set_relation_component(
        &mut self,
        origin: Entity,
        key: impl Into<ComponentKey>,
        target: Entity,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.check_edge(origin, target)?;
        let old = self
            .store
            .set_relation_component(origin, key.into(), target, value.into());
        self.sync_cache();
        Ok(old)
    }

    /// Gets the value carried to `target` via `key`, inherited or direct.
    ///
    /// # Errors
    ///
    /// Returns not-found if no such edge is visible.
    pub fn relation_component(&self, origin: Entity, key: &ComponentKey, target: Entity) -> Result<&Value> {
        self.check(target)?;
        self.relation_components(origin)?.get(key, target)
    }

    /// Removes a direct component edge, returning its value.
    ///
    /// # Errors
    ///
    /// Returns not-found if the edge does not exist.
    pub fn remove_relation_component(&mut self, origin: Entity, key: &ComponentKey, target: Entity) -> Result<Value> {
        self.check_edge(origin, target)?;
        let old = self
            .store
            .remove_relation_component(origin, key, target)
            .ok_or_else(|| Error::relation_component_not_found(origin, key.clone(), target))?;
        self.sync_cache();
        Ok(old)
    }

    /// Removes every direct component edge via `key`.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if this World did not issue `origin`.
    pub fn clear_relation_components(&mut self, origin: Entity, key: &ComponentKey) -> Result<()> {
        self.check(origin)?;
        let targets: Vec<Entity> = self
            .store
            .relation_component_targets(origin, key)
            .map(|(target, _)| target)
            .collect();
        for target in targets {
            self.store.remove_relation_component(origin, key, target);
        }
        self.sync_cache();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Evaluates a query through the cache.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error for a malformed query.
    pub fn evaluate(&self, query: &Query) -> Result<EntitySet> {
        let mut cache = self.cache.borrow_mut();
        kindred_query::evaluate(&self.store, &mut cache, query)
    }

    /// Builds `filter` with this World's defaults and evaluates it.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error if the filter is empty, only excludes,
    /// or requires and excludes the same atom.
    pub fn query(&self, filter: Filter) -> Result<EntitySet> {
        let query = filter.build_with(&self.config.default_traversal, self.config.max_propagation_depth)?;
        self.evaluate(&query)
    }

    /// Evaluates `query` and reads `keys` from every match.
    ///
    /// Rows are ordered by entity. Values are resolved through inheritance.
    ///
    /// # Errors
    ///
    /// Returns not-found if a match does not provide one of `keys`.
    pub fn collect(&self, query: &Query, keys: &[ComponentKey]) -> Result<Vec<(Entity, Vec<Value>)>> {
        let mut matches: Vec<Entity> = self.evaluate(query)?.into_iter().collect();
        matches.sort();
        matches
            .into_iter()
            .map(|entity| {
                let row = keys
                    .iter()
                    .map(|key| self.get(entity, key).cloned())
                    .collect::<Result<Vec<_>>>()?;
                Ok((entity, row))
            })
            .collect()
    }

    /// Hit, miss and drop counters of the query cache.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Number of cached query results.
    #[must_use]
    pub fn cached_queries(&self) -> usize {
        self.cache.borrow().len()
    }

    // ------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------

    /// Runs `hook` after every change to `key` on any entity.
    ///
    /// The hook receives the entity, the old value and the new value.
    pub fn on_component_changed<F>(&mut self, key: impl Into<ComponentKey>, hook: F) -> HookId
    where
        F: FnMut(Entity, Option<&Value>, Option<&Value>) + 'static,
    {
        self.hooks.register(key.into(), Box::new(hook))
    }

    /// Removes a hook. Returns false if it was not registered.
    pub fn remove_hook(&mut self, id: HookId) -> bool {
        self.hooks.remove(id)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Checks every index invariant.
    ///
    /// # Errors
    ///
    /// Returns a contract violation describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        self.store.validate()
    }

    pub(crate) fn identities(&self) -> &dyn Identities {
        self.identities.as_ref()
    }

    pub(crate) fn identities_mut(&mut self) -> &mut dyn Identities {
        self.identities.as_mut()
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub(crate) fn settle(&mut self) {
        self.sync_cache();
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("entities", &self.identities.len())
            .field("cached_queries", &self.cached_queries())
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
