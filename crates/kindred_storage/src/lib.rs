//! Entity tables and relation indices for Kindred.
//!
//! This crate provides:
//! - [`Store`]: components, tags and relations with forward and inverse indices
//! - [`RelationLookup`]: the four-shape relation index
//! - [`Identities`] and [`UidTable`]: uid to entity resolution
//! - [`traversal`]: inheritance along `is-a` style relations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod component;
mod identity;
mod lookup;
mod relation;
mod store;
mod tag;
pub mod traversal;

pub use component::ComponentTable;
pub use identity::{Identities, UidTable};
pub use lookup::{LookupKey, RelationLookup, Slot};
pub use relation::RelationTable;
pub use store::{Atom, Store};
pub use tag::TagTable;
pub use traversal::Traverse;
