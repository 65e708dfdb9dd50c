//! Identity table mapping uids to entity handles.
//!
//! Asking for the same uid twice yields the same [`Entity`]. The default
//! [`UidTable`] keeps every entry for the lifetime of its World: a handle is a
//! plain `Copy` index, so there is nothing to count references on, and a
//! forgotten uid costs one table slot rather than any correctness.

// Entity indices are u32; a World never holds anywhere near that many uids.
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;
use std::fmt;

use kindred_foundation::{Entity, Value, WorldId};
use tracing::debug;

/// Resolves uids to canonical entity handles for one World.
pub trait Identities: fmt::Debug {
    /// The World whose handles this table issues.
    fn world(&self) -> WorldId;

    /// Returns the handle for `uid`, creating it on first use.
    fn resolve(&mut self, uid: Value) -> Entity;

    /// Returns a handle for a uid no one else can name.
    fn resolve_fresh(&mut self) -> Entity {
        self.resolve(Value::unique())
    }

    /// Returns the handle for `uid` if it was ever resolved.
    fn lookup(&self, uid: &Value) -> Option<Entity>;

    /// Returns the uid an entity was resolved from.
    fn uid(&self, entity: Entity) -> Option<&Value>;

    /// Number of handles issued.
    fn len(&self) -> usize;

    /// Returns true if no handle was issued yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arena-backed identity table.
#[derive(Clone)]
pub struct UidTable {
    world: WorldId,
    uids: Vec<Value>,
    index: HashMap<Value, u32>,
}

impl UidTable {
    /// Creates an empty table for `world`.
    #[must_use]
    pub fn new(world: WorldId) -> Self {
        Self {
            world,
            uids: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl fmt::Debug for UidTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UidTable")
            .field("world", &self.world)
            .field("len", &self.uids.len())
            .finish()
    }
}

impl Identities for UidTable {
    fn world(&self) -> WorldId {
        self.world
    }

    fn resolve(&mut self, uid: Value) -> Entity {
        if let Some(&index) = self.index.get(&uid) {
            return Entity::new(self.world, index);
        }
        let index = self.uids.len() as u32;
        debug!(world = ?self.world, index, ?uid, "entity created");
        self.index.insert(uid.clone(), index);
        self.uids.push(uid);
        Entity::new(self.world, index)
    }

    fn lookup(&self, uid: &Value) -> Option<Entity> {
        self.index.get(uid).map(|&index| Entity::new(self.world, index))
    }

    fn uid(&self, entity: Entity) -> Option<&Value> {
        if entity.world() != self.world {
            return None;
        }
        self.uids.get(entity.index() as usize)
    }

    fn len(&self) -> usize {
        self.uids.len()
    }
}
