//! Entity queries for Kindred.
//!
//! This crate provides:
//! - [`Query`]: immutable, hashable query values (components, tags,
//!   relations, all-of/none-of, any-of, inheritance propagation)
//! - [`Filter`]: a builder for the usual all-of / none-of shape
//! - [`QueryCache`]: per-World results with transitive invalidation
//! - [`evaluate`]: smallest-first evaluation through the cache

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cache;
mod engine;
mod filter;
mod query;

pub use cache::{CacheStats, QueryCache};
pub use engine::evaluate;
pub use filter::Filter;
pub use query::{Query, QueryKind, RelationQuery, Selector};
