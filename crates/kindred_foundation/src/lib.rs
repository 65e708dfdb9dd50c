//! Core values, keys, entity handles, and errors for Kindred.
//!
//! This crate provides:
//! - [`Value`] - The dynamic value type used for components, tags, and uids
//! - [`Type`] - Value-type descriptors forming the type half of a component key
//! - [`ComponentKey`] / [`RelationKey`] - Keys into the store tables
//! - [`Entity`] - World-scoped entity handles and [`EntitySet`]
//! - [`Error`] - Typed failures shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod entity;
mod error;
mod key;
mod types;
mod value;

pub use entity::{Entity, EntitySet, WorldId};
pub use error::{Error, ErrorContext, ErrorKind, Missing, QueryProblem, Result};
pub use key::{ComponentKey, RelationKey};
pub use types::Type;
pub use value::{UniqueId, Value};
