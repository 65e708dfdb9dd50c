//! Four-shape relation index.
//!
//! Every relation edge `origin --key--> target` is indexed four ways:
//!
//! | key                          | set     |
//! |------------------------------|---------|
//! | `Origins { key, target }`    | origins |
//! | `Origins { key, Any }`       | origins |
//! | `Targets { origin, key }`    | targets |
//! | `Targets { Any, key }`       | targets |
//!
//! Empty sets are never stored. The wildcard entries are kept exact:
//! `Targets { Any, key }` contains a target only while some
//! `Origins { key, target }` entry exists for it, and likewise the other way.

use std::collections::HashMap;
use std::fmt;

use kindred_foundation::{Entity, EntitySet, RelationKey};

/// One end of a relation lookup key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// A specific entity.
    Entity(Entity),
    /// Any entity.
    Any,
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(e) => write!(f, "{e:?}"),
            Self::Any => write!(f, "*"),
        }
    }
}

impl From<Entity> for Slot {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

/// Key into the relation lookup.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupKey {
    /// Entities pointing at `target` via `key`.
    Origins {
        /// Relation key.
        key: RelationKey,
        /// Target slot.
        target: Slot,
    },
    /// Entities pointed at by `origin` via `key`.
    Targets {
        /// Origin slot.
        origin: Slot,
        /// Relation key.
        key: RelationKey,
    },
}

impl LookupKey {
    /// Entities pointing at `target` via `key`.
    #[must_use]
    pub fn origins(key: RelationKey, target: impl Into<Slot>) -> Self {
        Self::Origins {
            key,
            target: target.into(),
        }
    }

    /// Entities pointed at by `origin` via `key`.
    #[must_use]
    pub fn targets(origin: impl Into<Slot>, key: RelationKey) -> Self {
        Self::Targets {
            origin: origin.into(),
            key,
        }
    }

    /// The relation key.
    #[must_use]
    pub const fn key(&self) -> &RelationKey {
        match self {
            Self::Origins { key, .. } | Self::Targets { key, .. } => key,
        }
    }
}

impl fmt::Debug for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origins { key, target } => write!(f, "({key:?}, {target:?})"),
            Self::Targets { origin, key } => write!(f, "({origin:?}, {key:?}, _)"),
        }
    }
}

/// Derived index over relation tag and relation component edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationLookup {
    sets: HashMap<LookupKey, EntitySet>,
}

impl RelationLookup {
    /// Creates an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a lookup from a full list of edges.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Entity, RelationKey, Entity)>,
    {
        let mut lookup = Self::new();
        for (origin, key, target) in edges {
            lookup.insert(origin, &key, target);
        }
        lookup
    }

    /// The four lookup keys an edge is indexed under.
    #[must_use]
    pub fn fan_out(origin: Entity, key: &RelationKey, target: Entity) -> [LookupKey; 4] {
        [
            LookupKey::origins(key.clone(), target),
            LookupKey::origins(key.clone(), Slot::Any),
            LookupKey::targets(origin, key.clone()),
            LookupKey::targets(Slot::Any, key.clone()),
        ]
    }

    /// Indexes an edge.
    pub fn insert(&mut self, origin: Entity, key: &RelationKey, target: Entity) {
        let [by_target, any_target, by_origin, any_origin] = Self::fan_out(origin, key, target);
        for (lookup_key, member) in [
            (by_target, origin),
            (any_target, origin),
            (by_origin, target),
            (any_origin, target),
        ] {
            self.sets.entry(lookup_key).or_default().insert(member);
        }
    }

    /// Removes an edge from the index.
    ///
    /// The wildcard entries are only touched when the matching concrete entry
    /// empties.
    pub fn remove(&mut self, origin: Entity, key: &RelationKey, target: Entity) {
        if self.discard(&LookupKey::origins(key.clone(), target), origin) {
            self.discard(&LookupKey::targets(Slot::Any, key.clone()), target);
        }
        if self.discard(&LookupKey::targets(origin, key.clone()), target) {
            self.discard(&LookupKey::origins(key.clone(), Slot::Any), origin);
        }
    }

    /// Removes `member` from the set at `key`. Returns true if the set emptied.
    fn discard(&mut self, key: &LookupKey, member: Entity) -> bool {
        let Some(set) = self.sets.get_mut(key) else {
            return false;
        };
        set.remove(&member);
        if set.is_empty() {
            self.sets.remove(key);
            true
        } else {
            false
        }
    }

    /// Returns the set stored at `key`, if any.
    #[must_use]
    pub fn get(&self, key: &LookupKey) -> Option<&EntitySet> {
        self.sets.get(key)
    }

    /// Returns the set stored at `key`, or an empty set.
    #[must_use]
    pub fn entities(&self, key: &LookupKey) -> EntitySet {
        self.sets.get(key).cloned().unwrap_or_default()
    }

    /// Entities pointing at `target` via `key`.
    #[must_use]
    pub fn origins(&self, key: &RelationKey, target: Slot) -> EntitySet {
        self.entities(&LookupKey::origins(key.clone(), target))
    }

    /// Entities pointed at by `origin` via `key`.
    #[must_use]
    pub fn targets(&self, origin: Slot, key: &RelationKey) -> EntitySet {
        self.entities(&LookupKey::targets(origin, key.clone()))
    }

    /// Number of stored lookup keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
