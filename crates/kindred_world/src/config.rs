//! Configuration for a World.

use kindred_foundation::Value;

/// Configuration for a [`World`](crate::World).
///
/// Controls inheritance defaults and query caching.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Traversal keys used by entity views and by filters that do not set
    /// their own.
    pub default_traversal: Vec<Value>,

    /// Whether query results are cached (false = recompute every time).
    pub cache_queries: bool,

    /// Depth bound for filters that do not set one. `None` is unbounded.
    pub max_propagation_depth: Option<u32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            default_traversal: vec![Value::is_a()],
            cache_queries: true,
            max_propagation_depth: None,
        }
    }
}

impl WorldConfig {
    /// Creates a configuration that never caches query results.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            cache_queries: false,
            ..Self::default()
        }
    }

    /// Creates a configuration with inheritance turned off.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            default_traversal: Vec::new(),
            ..Self::default()
        }
    }

    /// Builder method to set the default traversal keys.
    #[must_use]
    pub fn with_default_traversal(mut self, keys: impl IntoIterator<Item = Value>) -> Self {
        self.default_traversal = keys.into_iter().collect();
        self
    }

    /// Builder method to enable/disable query caching.
    #[must_use]
    pub fn with_cache_queries(mut self, cache: bool) -> Self {
        self.cache_queries = cache;
        self
    }

    /// Builder method to set the default propagation depth.
    #[must_use]
    pub fn with_max_propagation_depth(mut self, depth: Option<u32>) -> Self {
        self.max_propagation_depth = depth;
        self
    }
}
