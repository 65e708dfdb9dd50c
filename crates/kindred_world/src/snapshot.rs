//! Saving and restoring Worlds.
//!
//! A [`WorldSnapshot`] lists every entity that holds data, keyed by uid,
//! with its components, tags and outgoing relations. Values are stored as
//! [`Plain`] trees: an entity reference becomes the referenced entity's uid
//! and each distinct [`UniqueId`] becomes a small number, so the same token
//! appearing twice is restored as one fresh token appearing twice.
//!
//! The relation lookup is not saved. Restoring replays every edge into an
//! empty store, which rebuilds it.

use std::collections::{HashMap, HashSet};

use kindred_foundation::{ComponentKey, Entity, Error, Result, Type, UniqueId, Value, WorldId};
use kindred_storage::Identities;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::config::WorldConfig;
use crate::world::World;

/// Format version written by [`World::snapshot`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// A value with entity references replaced by uids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Plain {
    /// Nil.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Finite float.
    Float(f64),
    /// NaN or an infinity, by bit pattern. JSON has no spelling for these.
    FloatBits(u64),
    /// String.
    String(String),
    /// Keyword.
    Keyword(String),
    /// The n-th distinct unique token of the snapshot.
    Unique(u32),
    /// Reference to the entity with this uid.
    Entity(Box<Plain>),
    /// List.
    List(Vec<Plain>),
    /// Map as ordered key/value pairs.
    Map(Vec<(Plain, Plain)>),
}

/// A component key with its tag in plain form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlainKey {
    /// Tag of a tagged key.
    pub tag: Option<Plain>,
    /// Value type.
    pub ty: Type,
}

/// Everything one entity holds directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The entity's uid.
    pub uid: Plain,
    /// Components.
    pub components: Vec<(PlainKey, Plain)>,
    /// Tags.
    pub tags: Vec<Plain>,
    /// Relation tags and the uids of their targets.
    pub relation_tags: Vec<(Plain, Vec<Plain>)>,
    /// Component relations: key, then target uid and carried value.
    pub relation_components: Vec<(PlainKey, Vec<(Plain, Plain)>)>,
}

/// Plain, serializable form of a World.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Format version.
    pub version: u32,
    /// One record per entity holding data, ordered by creation.
    pub entities: Vec<EntityRecord>,
}

// =============================================================================
// Unstructure
// =============================================================================

struct Unstructurer<'a> {
    world: WorldId,
    identities: &'a dyn Identities,
    seen: HashMap<UniqueId, u32>,
}

impl Unstructurer<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn value(&mut self, value: &Value) -> Result<Plain> {
        Ok(match value {
            Value::Nil => Plain::Nil,
            Value::Bool(b) => Plain::Bool(*b),
            Value::Int(n) => Plain::Int(*n),
            Value::Float(f) if f.is_finite() => Plain::Float(*f),
            Value::Float(f) => Plain::FloatBits(f.to_bits()),
            Value::String(s) => Plain::String(s.to_string()),
            Value::Keyword(k) => Plain::Keyword(k.to_string()),
            Value::Unique(id) => {
                let next = self.seen.len() as u32;
                Plain::Unique(*self.seen.entry(*id).or_insert(next))
            }
            Value::Entity(entity) => Plain::Entity(Box::new(self.uid(*entity)?)),
            Value::List(items) => Plain::List(items.iter().map(|v| self.value(v)).collect::<Result<_>>()?),
            Value::Map(map) => Plain::Map(
                map.iter()
                    .map(|(k, v)| Ok((self.value(k)?, self.value(v)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    fn uid(&mut self, entity: Entity) -> Result<Plain> {
        if entity.world() != self.world {
            return Err(Error::foreign_entity(entity, self.world));
        }
        let uid = self
            .identities
            .uid(entity)
            .ok_or_else(|| Error::snapshot(format!("{entity:?} has no uid")))?;
        self.value(uid)
    }

    fn key(&mut self, key: &ComponentKey) -> Result<PlainKey> {
        Ok(PlainKey {
            tag: key.tag().map(|tag| self.value(tag)).transpose()?,
            ty: key.value_type().clone(),
        })
    }
}

// =============================================================================
// Structure
// =============================================================================

struct Structurer<'a> {
    identities: &'a mut dyn Identities,
    seen: HashMap<u32, UniqueId>,
}

impl Structurer<'_> {
    fn value(&mut self, plain: &Plain) -> Value {
        match plain {
            Plain::Nil => Value::Nil,
            Plain::Bool(b) => Value::Bool(*b),
            Plain::Int(n) => Value::Int(*n),
            Plain::Float(f) => Value::Float(*f),
            Plain::FloatBits(bits) => Value::Float(f64::from_bits(*bits)),
            Plain::String(s) => Value::from(s.as_str()),
            Plain::Keyword(k) => Value::keyword(k),
            Plain::Unique(n) => Value::Unique(*self.seen.entry(*n).or_insert_with(UniqueId::new)),
            Plain::Entity(uid) => Value::Entity(self.entity(uid)),
            Plain::List(items) => Value::List(items.iter().map(|p| self.value(p)).collect()),
            Plain::Map(pairs) => Value::Map(pairs.iter().map(|(k, v)| (self.value(k), self.value(v))).collect()),
        }
    }

    fn entity(&mut self, uid: &Plain) -> Entity {
        let uid = self.value(uid);
        self.identities.resolve(uid)
    }

    fn key(&mut self, key: &PlainKey) -> ComponentKey {
        match &key.tag {
            Some(tag) => ComponentKey::Tagged(self.value(tag), key.ty.clone()),
            None => ComponentKey::Bare(key.ty.clone()),
        }
    }
}

// =============================================================================
// World API
// =============================================================================

impl World {
    /// Captures everything this World holds.
    ///
    /// # Errors
    ///
    /// Returns a foreign entity error if a value references an entity of
    /// another World.
    pub fn snapshot(&self) -> Result<WorldSnapshot> {
        let store = self.store();
        let mut out = Unstructurer {
            world: self.id(),
            identities: self.identities(),
            seen: HashMap::new(),
        };

        let mut entities: Vec<Entity> = store.entities().into_iter().collect();
        entities.sort();

        let mut records = Vec::with_capacity(entities.len());
        for entity in entities {
            let mut components: Vec<(&ComponentKey, &Value)> = store
                .component_keys(entity)
                .filter_map(|key| Some((key, store.component(entity, key)?)))
                .collect();
            components.sort_by(|a, b| a.0.cmp(b.0));

            let mut tags: Vec<&Value> = store.tags(entity).collect();
            tags.sort();

            let mut relation_tags: Vec<&Value> = store.relation_tag_keys(entity).collect();
            relation_tags.sort();

            let mut relation_components: Vec<&ComponentKey> = store.relation_component_keys(entity).collect();
            relation_components.sort();

            let record = EntityRecord {
                uid: out.uid(entity)?,
                components: components
                    .into_iter()
                    .map(|(key, value)| Ok((out.key(key)?, out.value(value)?)))
                    .collect::<Result<_>>()?,
                tags: tags.into_iter().map(|tag| out.value(tag)).collect::<Result<_>>()?,
                relation_tags: relation_tags
                    .into_iter()
                    .map(|tag| {
                        let mut targets: Vec<Entity> = store.relation_targets(entity, tag).collect();
                        targets.sort();
                        let targets = targets.into_iter().map(|t| out.uid(t)).collect::<Result<_>>()?;
                        Ok((out.value(tag)?, targets))
                    })
                    .collect::<Result<_>>()?,
                relation_components: relation_components
                    .into_iter()
                    .map(|key| {
                        let mut edges: Vec<(Entity, &Value)> = store.relation_component_targets(entity, key).collect();
                        edges.sort_by_key(|(target, _)| *target);
                        let edges = edges
                            .into_iter()
                            .map(|(target, value)| Ok((out.uid(target)?, out.value(value)?)))
                            .collect::<Result<_>>()?;
                        Ok((out.key(key)?, edges))
                    })
                    .collect::<Result<_>>()?,
            };
            records.push(record);
        }

        debug!(world = ?self.id(), entities = records.len(), "snapshot taken");
        Ok(WorldSnapshot {
            version: SNAPSHOT_VERSION,
            entities: records,
        })
    }

    /// Restores a World from a snapshot.
    ///
    /// The new World issues its own handles. Entities are found again by
    /// uid. Hooks do not exist yet, so none run.
    ///
    /// # Errors
    ///
    /// Returns a snapshot error for an unknown version or a uid recorded
    /// twice.
    pub fn from_snapshot(snapshot: &WorldSnapshot, config: WorldConfig) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::snapshot(format!(
                "unsupported snapshot version {}, expected {SNAPSHOT_VERSION}",
                snapshot.version
            )));
        }

        let mut world = Self::with_config(config);
        let mut restored = HashSet::new();
        let mut seen = HashMap::new();

        for record in &snapshot.entities {
            // Decode first: the store and identity table are borrowed apart.
            let mut input = Structurer {
                identities: world.identities_mut(),
                seen: std::mem::take(&mut seen),
            };
            let entity = input.entity(&record.uid);
            if !restored.insert(entity) {
                return Err(Error::snapshot(format!("uid {:?} is recorded twice", record.uid)));
            }
            let components: Vec<(ComponentKey, Value)> = record
                .components
                .iter()
                .map(|(key, value)| (input.key(key), input.value(value)))
                .collect();
            let tags: Vec<Value> = record.tags.iter().map(|tag| input.value(tag)).collect();
            let relation_tags: Vec<(Value, Entity)> = record
                .relation_tags
                .iter()
                .flat_map(|(tag, targets)| targets.iter().map(move |target| (tag, target)))
                .map(|(tag, target)| (input.value(tag), input.entity(target)))
                .collect();
            let relation_components: Vec<(ComponentKey, Entity, Value)> = record
                .relation_components
                .iter()
                .flat_map(|(key, edges)| edges.iter().map(move |edge| (key, edge)))
                .map(|(key, (target, value))| (input.key(key), input.entity(target), input.value(value)))
                .collect();
            seen = input.seen;

            let store = world.store_mut();
            for (key, value) in components {
                store.set_component(entity, key, value);
            }
            for tag in tags {
                store.add_tag(entity, tag);
            }
            for (tag, target) in relation_tags {
                store.add_relation_tag(entity, tag, target);
            }
            for (key, target, value) in relation_components {
                store.set_relation_component(entity, key, target, value);
            }
        }
        world.settle();

        debug!(world = ?world.id(), entities = restored.len(), "snapshot restored");
        Ok(world)
    }
}

impl Serialize for World {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let snapshot = self
            .snapshot()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        snapshot.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for World {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let snapshot = WorldSnapshot::deserialize(deserializer)?;
        World::from_snapshot(&snapshot, WorldConfig::default()).map_err(<D::Error as serde::de::Error>::custom)
    }
}
