//! The World facade for Kindred.
//!
//! This crate provides:
//! - [`World`]: entities, components, tags and relations with cached queries
//! - [`Components`], [`Tags`], [`RelationTags`], [`RelationComponents`]:
//!   read views resolving through inheritance
//! - [`ChangeHooks`]: per-World component change callbacks
//! - [`WorldConfig`]: inheritance and caching defaults
//! - [`WorldSnapshot`]: plain, serializable form of a World

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod hooks;
mod snapshot;
mod views;
mod world;

pub use config::WorldConfig;
pub use hooks::{ChangeHooks, ComponentHook, HookId};
pub use snapshot::{EntityRecord, Plain, PlainKey, SNAPSHOT_VERSION, WorldSnapshot};
pub use views::{Components, RelationComponents, RelationTags, Tags};
pub use world::World;
