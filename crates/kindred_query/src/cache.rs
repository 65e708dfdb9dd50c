//! Query result cache with dependency tracking.
//!
//! Each cached result records what it was computed from: the storage atoms
//! it read directly and the sub-queries it evaluated. Touching an atom drops
//! every query that read it, then every query that evaluated a dropped
//! query, and so on until nothing is left to drop.

use std::collections::{HashMap, HashSet};

use kindred_foundation::EntitySet;
use kindred_storage::Atom;
use tracing::debug;

use crate::query::Query;

/// What one evaluation read.
#[derive(Clone, Debug, Default)]
pub(crate) struct Dependencies {
    pub(crate) atoms: Vec<Atom>,
    pub(crate) queries: Vec<Query>,
}

/// Counters describing cache behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Evaluations answered from the cache.
    pub hits: u64,
    /// Evaluations that had to compute a result.
    pub misses: u64,
    /// Cached results dropped by invalidation.
    pub drops: u64,
}

/// Per-World cache of query results.
#[derive(Clone, Debug)]
pub struct QueryCache {
    enabled: bool,
    results: HashMap<Query, EntitySet>,
    /// Queries to drop when an atom is touched.
    by_atom: HashMap<Atom, HashSet<Query>>,
    /// Queries to drop when a query is dropped.
    dependents: HashMap<Query, HashSet<Query>>,
    /// What each cached query was registered under, for unlinking.
    reads: HashMap<Query, Dependencies>,
    stats: CacheStats,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            results: HashMap::new(),
            by_atom: HashMap::new(),
            dependents: HashMap::new(),
            reads: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Creates a cache that never stores anything.
    ///
    /// Every evaluation through it is computed from scratch.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Returns true if results are stored.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Looks up a cached result.
    pub fn get(&mut self, query: &Query) -> Option<EntitySet> {
        let hit = self.results.get(query).cloned();
        if hit.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        hit
    }

    /// Checks whether a result is cached, without counting a lookup.
    #[must_use]
    pub fn contains(&self, query: &Query) -> bool {
        self.results.contains_key(query)
    }

    /// Stores a result along with what it was computed from.
    pub(crate) fn insert(&mut self, query: Query, result: EntitySet, deps: Dependencies) {
        if !self.enabled {
            return;
        }
        self.unlink(&query);
        for atom in &deps.atoms {
            self.by_atom.entry(atom.clone()).or_default().insert(query.clone());
        }
        for sub in &deps.queries {
            self.dependents.entry(sub.clone()).or_default().insert(query.clone());
        }
        self.reads.insert(query.clone(), deps);
        self.results.insert(query, result);
    }

    /// Removes `query` from the reverse indexes it was registered in.
    fn unlink(&mut self, query: &Query) {
        let Some(deps) = self.reads.remove(query) else {
            return;
        };
        for atom in &deps.atoms {
            if let Some(queries) = self.by_atom.get_mut(atom) {
                queries.remove(query);
                if queries.is_empty() {
                    self.by_atom.remove(atom);
                }
            }
        }
        for sub in &deps.queries {
            if let Some(queries) = self.dependents.get_mut(sub) {
                queries.remove(query);
                if queries.is_empty() {
                    self.dependents.remove(sub);
                }
            }
        }
    }

    /// Drops every result depending on `atom`. Returns how many were dropped.
    pub fn touch(&mut self, atom: &Atom) -> usize {
        let Some(queries) = self.by_atom.remove(atom) else {
            return 0;
        };
        let dropped = self.drop_all(queries);
        if dropped > 0 {
            debug!(?atom, dropped, "query cache invalidated");
        }
        dropped
    }

    /// Drops `query` and everything depending on it. Returns how many
    /// results were dropped.
    pub fn invalidate(&mut self, query: &Query) -> usize {
        self.drop_all([query.clone()])
    }

    fn drop_all(&mut self, queries: impl IntoIterator<Item = Query>) -> usize {
        let mut stack: Vec<Query> = queries.into_iter().collect();
        let mut dropped = 0;
        while let Some(query) = stack.pop() {
            if self.results.remove(&query).is_some() {
                dropped += 1;
            }
            self.unlink(&query);
            // Removed before following, so cyclic registrations terminate.
            if let Some(dependents) = self.dependents.remove(&query) {
                stack.extend(dependents);
            }
        }
        self.stats.drops += dropped as u64;
        dropped
    }

    /// Drops every cached result and dependency record.
    pub fn clear(&mut self) {
        self.results.clear();
        self.by_atom.clear();
        self.dependents.clear();
        self.reads.clear();
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Hit, miss and drop counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}
