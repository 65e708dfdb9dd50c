//! Immutable query values.
//!
//! A [`Query`] is a cheaply cloneable, hashable description of a set of
//! entities. Structurally equal queries are interchangeable, which is what
//! lets the cache key on them. Every constructor validates and normalizes,
//! so a `Query` that exists is one the engine can evaluate.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use kindred_foundation::{ComponentKey, Entity, Error, QueryProblem, RelationKey, Result, Value};

// =============================================================================
// Relation atoms
// =============================================================================

/// One end of a relation atom.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    /// A specific entity.
    Entity(Entity),
    /// Any entity.
    Any,
    /// Every entity matching a sub-query.
    Matching(Query),
}

impl From<Entity> for Selector {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<Query> for Selector {
    fn from(query: Query) -> Self {
        Self::Matching(query)
    }
}

/// A relation atom: which side of an edge is wanted, and what the other side must be.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationQuery {
    /// Origins of edges via `key` into `target`.
    Origins {
        /// Relation key.
        key: RelationKey,
        /// What the edge must point at.
        target: Selector,
    },
    /// Targets of edges via `key` out of `origin`.
    Targets {
        /// What the edge must start from.
        origin: Selector,
        /// Relation key.
        key: RelationKey,
    },
}

impl RelationQuery {
    /// Origins of edges via `key` into `target`.
    #[must_use]
    pub fn origins(key: impl Into<RelationKey>, target: impl Into<Selector>) -> Self {
        Self::Origins {
            key: key.into(),
            target: target.into(),
        }
    }

    /// Targets of edges via `key` out of `origin`.
    #[must_use]
    pub fn targets(origin: impl Into<Selector>, key: impl Into<RelationKey>) -> Self {
        Self::Targets {
            origin: origin.into(),
            key: key.into(),
        }
    }

    /// Restricts a sub-query selector to entities that can take part in the
    /// relation at all, so that it stays small and its cache entry tracks
    /// the relation.
    fn normalized(self) -> Self {
        match self {
            Self::Origins {
                key,
                target: Selector::Matching(sub),
            } => {
                let pointed_at = Query::relation_unchecked(Self::targets(Selector::Any, key.clone()));
                Self::Origins {
                    target: Selector::Matching(Query::intersect(sub, pointed_at)),
                    key,
                }
            }
            Self::Targets {
                origin: Selector::Matching(sub),
                key,
            } => {
                let pointing = Query::relation_unchecked(Self::origins(key.clone(), Selector::Any));
                Self::Targets {
                    origin: Selector::Matching(Query::intersect(sub, pointing)),
                    key,
                }
            }
            other => other,
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// The variants a query can take.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKind {
    /// Entities holding a component key directly.
    Component(ComponentKey),
    /// Entities holding a tag directly.
    Tag(Value),
    /// Entities on one side of a relation.
    Relation(RelationQuery),
    /// Entities matching every `all_of` query and no `none_of` query.
    All {
        /// Required queries, never empty.
        all_of: BTreeSet<Query>,
        /// Excluded queries, disjoint from `all_of`.
        none_of: BTreeSet<Query>,
    },
    /// Entities matching at least one query.
    Any(BTreeSet<Query>),
    /// Entities matching `sub`, plus everything inheriting from them.
    Propagate {
        /// The query to propagate.
        sub: Query,
        /// Relation tags inheritance follows, never empty.
        traverse: Vec<Value>,
        /// Maximum inheritance distance, `None` for unbounded.
        depth: Option<u32>,
    },
}

/// An immutable entity query.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Query(Arc<QueryKind>);

impl Query {
    fn new(kind: QueryKind) -> Self {
        Self(Arc::new(kind))
    }

    /// The variant of this query.
    #[must_use]
    pub fn kind(&self) -> &QueryKind {
        &self.0
    }

    /// Entities holding `key` directly.
    #[must_use]
    pub fn component(key: impl Into<ComponentKey>) -> Self {
        Self::new(QueryKind::Component(key.into()))
    }

    /// Entities holding `tag` directly.
    #[must_use]
    pub fn tag(tag: impl Into<Value>) -> Self {
        Self::new(QueryKind::Tag(tag.into()))
    }

    /// Entities on one side of a relation.
    #[must_use]
    pub fn relation(relation: RelationQuery) -> Self {
        Self::relation_unchecked(relation.normalized())
    }

    fn relation_unchecked(relation: RelationQuery) -> Self {
        Self::new(QueryKind::Relation(relation))
    }

    /// Origins of edges via `key` into `target`.
    #[must_use]
    pub fn origins(key: impl Into<RelationKey>, target: impl Into<Selector>) -> Self {
        Self::relation(RelationQuery::origins(key, target))
    }

    /// Targets of edges via `key` out of `origin`.
    #[must_use]
    pub fn targets(origin: impl Into<Selector>, key: impl Into<RelationKey>) -> Self {
        Self::relation(RelationQuery::targets(origin, key))
    }

    /// Entities matching every query in `all_of` and none in `none_of`.
    ///
    /// A lone required query with no exclusions is returned as is.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error if `all_of` is empty, or if a query
    /// appears on both sides.
    pub fn all(
        all_of: impl IntoIterator<Item = Query>,
        none_of: impl IntoIterator<Item = Query>,
    ) -> Result<Self> {
        let mut all_of: BTreeSet<Query> = all_of.into_iter().collect();
        let none_of: BTreeSet<Query> = none_of.into_iter().collect();
        check_all(&all_of, &none_of)?;
        if none_of.is_empty() && all_of.len() == 1 {
            if let Some(only) = all_of.pop_first() {
                return Ok(only);
            }
        }
        Ok(Self::new(QueryKind::All { all_of, none_of }))
    }

    /// Entities matching at least one of `queries`.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error if `queries` is empty.
    pub fn any(queries: impl IntoIterator<Item = Query>) -> Result<Self> {
        let mut queries: BTreeSet<Query> = queries.into_iter().collect();
        if queries.len() == 1 {
            if let Some(only) = queries.pop_first() {
                return Ok(only);
            }
        }
        if queries.is_empty() {
            return Err(Error::invalid_query(QueryProblem::NoInclusions));
        }
        Ok(Self::new(QueryKind::Any(queries)))
    }

    /// Entities matching `sub`, plus every entity inheriting from one of
    /// them through `traverse`, at most `depth` steps away.
    ///
    /// No traversal keys or a depth of zero leave `sub` unchanged.
    #[must_use]
    pub fn propagate(sub: Query, traverse: Vec<Value>, depth: Option<u32>) -> Self {
        if traverse.is_empty() || depth == Some(0) {
            return sub;
        }
        Self::new(QueryKind::Propagate { sub, traverse, depth })
    }

    /// Combines two queries into one requiring both.
    ///
    /// The requirements and exclusions of `All` queries are merged.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error if the merged query requires and
    /// excludes the same query.
    pub fn and(&self, other: &Query) -> Result<Self> {
        let (mut all_of, mut none_of) = self.split();
        let (other_all, other_none) = other.split();
        all_of.extend(other_all);
        none_of.extend(other_none);
        Self::all(all_of, none_of)
    }

    fn split(&self) -> (BTreeSet<Query>, BTreeSet<Query>) {
        match self.kind() {
            QueryKind::All { all_of, none_of } => (all_of.clone(), none_of.clone()),
            _ => (BTreeSet::from([self.clone()]), BTreeSet::new()),
        }
    }

    /// Intersection of two valid queries; cannot contradict.
    fn intersect(a: Query, b: Query) -> Self {
        if a == b {
            return a;
        }
        Self::new(QueryKind::All {
            all_of: BTreeSet::from([a, b]),
            none_of: BTreeSet::new(),
        })
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Checks the shape of an `All` query.
pub(crate) fn check_all(all_of: &BTreeSet<Query>, none_of: &BTreeSet<Query>) -> Result<()> {
    if all_of.is_empty() {
        let problem = if none_of.is_empty() {
            QueryProblem::NoInclusions
        } else {
            QueryProblem::ExclusionOnly
        };
        return Err(Error::invalid_query(problem));
    }
    if let Some(both) = all_of.intersection(none_of).next() {
        return Err(Error::invalid_query(QueryProblem::Contradiction(format!("{both:?}"))));
    }
    Ok(())
}
