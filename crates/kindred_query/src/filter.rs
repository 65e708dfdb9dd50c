//! Builder for the common all-of / none-of query shape.

use kindred_foundation::{ComponentKey, Result, Value};

use crate::query::{Query, RelationQuery};

/// Builds a query from required and excluded components, tags and relations.
///
/// Every atom is matched through inheritance: an entity matches a required
/// component if it or anything it inherits from holds it. Inheritance
/// follows the traversal keys, `is-a` unless set otherwise, and can be
/// turned off with an empty key list.
///
/// ```
/// use kindred_foundation::{ComponentKey, Type};
/// use kindred_query::Filter;
///
/// let query = Filter::new()
///     .with_component(ComponentKey::of(Type::Int))
///     .without_tag("dead")
///     .depth(2)
///     .build()
///     .unwrap();
/// # let _ = query;
/// ```
#[derive(Clone, Debug, Default)]
pub struct Filter {
    all_of: Vec<Query>,
    none_of: Vec<Query>,
    traverse: Option<Vec<Value>>,
    depth: Option<u32>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a component.
    #[must_use]
    pub fn with_component(mut self, key: impl Into<ComponentKey>) -> Self {
        self.all_of.push(Query::component(key));
        self
    }

    /// Requires every component in `keys`.
    #[must_use]
    pub fn with_components(mut self, keys: impl IntoIterator<Item = ComponentKey>) -> Self {
        self.all_of.extend(keys.into_iter().map(Query::component));
        self
    }

    /// Requires a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Value>) -> Self {
        self.all_of.push(Query::tag(tag));
        self
    }

    /// Requires every tag in `tags`.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Value>) -> Self {
        self.all_of.extend(tags.into_iter().map(Query::tag));
        self
    }

    /// Requires a relation.
    #[must_use]
    pub fn with_relation(mut self, relation: RelationQuery) -> Self {
        self.all_of.push(Query::relation(relation));
        self
    }

    /// Excludes a component.
    #[must_use]
    pub fn without_component(mut self, key: impl Into<ComponentKey>) -> Self {
        self.none_of.push(Query::component(key));
        self
    }

    /// Excludes a tag.
    #[must_use]
    pub fn without_tag(mut self, tag: impl Into<Value>) -> Self {
        self.none_of.push(Query::tag(tag));
        self
    }

    /// Excludes a relation.
    #[must_use]
    pub fn without_relation(mut self, relation: RelationQuery) -> Self {
        self.none_of.push(Query::relation(relation));
        self
    }

    /// Sets the traversal keys. An empty list disables inheritance.
    #[must_use]
    pub fn traverse(mut self, keys: impl IntoIterator<Item = Value>) -> Self {
        self.traverse = Some(keys.into_iter().collect());
        self
    }

    /// Limits how far inheritance reaches.
    #[must_use]
    pub const fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Builds the query, inheriting through `is-a` at unbounded depth unless
    /// set otherwise.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error if nothing is required, or if the same
    /// atom is both required and excluded.
    pub fn build(self) -> Result<Query> {
        self.build_with(&[Value::is_a()], None)
    }

    /// Builds the query with the given defaults for traversal keys and depth.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error if nothing is required, or if the same
    /// atom is both required and excluded.
    pub fn build_with(self, default_traverse: &[Value], default_depth: Option<u32>) -> Result<Query> {
        let traverse = self.traverse.unwrap_or_else(|| default_traverse.to_vec());
        let depth = self.depth.or(default_depth);
        let wrap = |atom: Query| Query::propagate(atom, traverse.clone(), depth);
        Query::all(
            self.all_of.into_iter().map(wrap),
            self.none_of.into_iter().map(wrap),
        )
    }
}
