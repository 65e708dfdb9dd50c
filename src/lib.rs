//! Kindred - Entity-component-relation store with cached queries
//!
//! This crate re-exports all layers of the Kindred system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: kindred_world      — World facade, entity views, hooks, snapshots
//! Layer 2: kindred_query      — Query values, result cache, evaluation
//! Layer 1: kindred_storage    — Dual-indexed tables, relation lookup, traversal
//! Layer 0: kindred_foundation — Core types (Value, Entity, keys, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use kindred::foundation::{ComponentKey, Type};
//! use kindred::query::Filter;
//! use kindred::world::World;
//!
//! let mut world = World::new();
//! let base = world.entity("base");
//! world.set_component(base, ComponentKey::of(Type::String), "base").unwrap();
//! let instance = world.instantiate(base).unwrap();
//!
//! let found = world
//!     .query(Filter::new().with_component(ComponentKey::of(Type::String)))
//!     .unwrap();
//! assert!(found.contains(&instance));
//! ```

pub use kindred_foundation as foundation;
pub use kindred_query as query;
pub use kindred_storage as storage;
pub use kindred_world as world;
