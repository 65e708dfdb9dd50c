//! Value-type descriptors used as the type half of a component key.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor naming the kind of value a component holds.
///
/// Types only distinguish component keys from one another. Nothing checks
/// that a stored value actually matches the type of its key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type.
    Nil,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// String type.
    String,
    /// Keyword type.
    Keyword,
    /// Entity reference type.
    Entity,
    /// Homogeneous list type.
    List(Box<Type>),
    /// Homogeneous map type.
    Map(Box<Type>, Box<Type>),
    /// A user-declared type, compared by name.
    Named(Arc<str>),
}

impl Type {
    /// Creates a list type with the given element type.
    #[must_use]
    pub fn list(element: Type) -> Self {
        Self::List(Box::new(element))
    }

    /// Creates a map type with the given key and value types.
    #[must_use]
    pub fn map(key: Type, value: Type) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Creates a user-declared type.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, ":nil"),
            Self::Bool => write!(f, ":bool"),
            Self::Int => write!(f, ":int"),
            Self::Float => write!(f, ":float"),
            Self::String => write!(f, ":string"),
            Self::Keyword => write!(f, ":keyword"),
            Self::Entity => write!(f, ":entity"),
            Self::List(elem) => write!(f, "[:list {elem}]"),
            Self::Map(k, v) => write!(f, "[:map {k} {v}]"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}
