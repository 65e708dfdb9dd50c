//! Component and relation keys.

use std::fmt;

use crate::types::Type;
use crate::value::Value;

/// Key under which a component value is stored.
///
/// A bare key holds at most one value of its type per entity. A tagged key
/// lets an entity carry several values of the same type under different
/// names. The two forms never compare equal, even for the same type.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKey {
    /// Keyed by value type only.
    Bare(Type),
    /// Keyed by a discriminating tag and a value type.
    Tagged(Value, Type),
}

impl ComponentKey {
    /// Bare key for `ty`.
    #[must_use]
    pub const fn of(ty: Type) -> Self {
        Self::Bare(ty)
    }

    /// Tagged key for `ty`.
    #[must_use]
    pub fn named(tag: impl Into<Value>, ty: Type) -> Self {
        Self::Tagged(tag.into(), ty)
    }

    /// The value type half of the key.
    #[must_use]
    pub const fn value_type(&self) -> &Type {
        match self {
            Self::Bare(ty) | Self::Tagged(_, ty) => ty,
        }
    }

    /// The tag half of the key, if any.
    #[must_use]
    pub const fn tag(&self) -> Option<&Value> {
        match self {
            Self::Bare(_) => None,
            Self::Tagged(tag, _) => Some(tag),
        }
    }
}

impl From<Type> for ComponentKey {
    fn from(ty: Type) -> Self {
        Self::Bare(ty)
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(ty) => write!(f, "{ty}"),
            Self::Tagged(tag, ty) => write!(f, "({tag:?} {ty})"),
        }
    }
}

/// Key of one relation edge.
///
/// Tag relations and component relations live in separate tables; keeping
/// the distinction in the key stops them colliding in the relation lookup.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKey {
    /// A relation with no payload.
    Tag(Value),
    /// A relation carrying a component value per target.
    Component(ComponentKey),
}

impl RelationKey {
    /// Tag relation key.
    #[must_use]
    pub fn tag(tag: impl Into<Value>) -> Self {
        Self::Tag(tag.into())
    }

    /// The default inheritance relation.
    #[must_use]
    pub fn is_a() -> Self {
        Self::Tag(Value::is_a())
    }
}

impl From<ComponentKey> for RelationKey {
    fn from(key: ComponentKey) -> Self {
        Self::Component(key)
    }
}

impl From<Value> for RelationKey {
    fn from(tag: Value) -> Self {
        Self::Tag(tag)
    }
}

impl fmt::Debug for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "{tag:?}"),
            Self::Component(key) => write!(f, "{key}"),
        }
    }
}
