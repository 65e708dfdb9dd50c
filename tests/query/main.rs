//! Integration tests for Layer 2: Query
//!
//! Tests for query construction, evaluation, propagation, and cache
//! invalidation against a bare store.

mod relations;
mod validity;

use kindred_foundation::{Entity, EntitySet, WorldId};
use kindred_query::{Query, QueryCache, evaluate};
use kindred_storage::Store;

/// A store with a cache, kept in sync the way a World keeps them.
pub struct Harness {
    pub store: Store,
    pub cache: QueryCache,
    world: WorldId,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Store::new(),
            cache: QueryCache::new(),
            world: WorldId::fresh(),
        }
    }

    pub fn entities(&self, n: u32) -> Vec<Entity> {
        (0..n).map(|i| Entity::new(self.world, i)).collect()
    }

    /// Forwards the store's touch journal to the cache.
    pub fn sync(&mut self) {
        for atom in self.store.take_touched() {
            self.cache.touch(&atom);
        }
    }

    pub fn eval(&mut self, query: &Query) -> EntitySet {
        self.sync();
        evaluate(&self.store, &mut self.cache, query).unwrap()
    }

    /// Evaluates without the cache, for comparison.
    pub fn fresh(&self, query: &Query) -> EntitySet {
        evaluate(&self.store, &mut QueryCache::disabled(), query).unwrap()
    }
}

pub fn set(entities: &[Entity]) -> EntitySet {
    entities.iter().copied().collect()
}
