//! Error types for Kindred.
//!
//! Uses `thiserror` for the error definitions. Every failure is local and
//! synchronous; callers match on [`ErrorKind`] to tell them apart.

use std::fmt;

use thiserror::Error;

use crate::entity::{Entity, WorldId};
use crate::key::{ComponentKey, RelationKey};
use crate::value::Value;

/// Result alias used throughout Kindred.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Kindred operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a missing component error.
    #[must_use]
    pub fn component_not_found(entity: Entity, key: ComponentKey) -> Self {
        Self::new(ErrorKind::NotFound(Missing::Component { entity, key }))
    }

    /// Creates a missing tag error.
    #[must_use]
    pub fn tag_not_found(entity: Entity, tag: Value) -> Self {
        Self::new(ErrorKind::NotFound(Missing::Tag { entity, tag }))
    }

    /// Creates a missing relation target error.
    #[must_use]
    pub fn relation_target_not_found(origin: Entity, key: RelationKey) -> Self {
        Self::new(ErrorKind::NotFound(Missing::RelationTarget { origin, key }))
    }

    /// Creates a missing relation component error.
    #[must_use]
    pub fn relation_component_not_found(origin: Entity, key: ComponentKey, target: Entity) -> Self {
        Self::new(ErrorKind::NotFound(Missing::RelationComponent {
            origin,
            key,
            target,
        }))
    }

    /// Creates an unknown uid error.
    #[must_use]
    pub fn uid_not_found(uid: Value) -> Self {
        Self::new(ErrorKind::NotFound(Missing::Uid(uid)))
    }

    /// Creates an ambiguous relation error.
    #[must_use]
    pub fn ambiguous_relation(origin: Entity, key: RelationKey, count: usize) -> Self {
        Self::new(ErrorKind::AmbiguousRelation { origin, key, count })
    }

    /// Creates an invalid query error.
    #[must_use]
    pub fn invalid_query(problem: QueryProblem) -> Self {
        Self::new(ErrorKind::InvalidQuery(problem))
    }

    /// Creates a contract violation error.
    #[must_use]
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ContractViolation(message.into()))
    }

    /// Creates a foreign entity error.
    #[must_use]
    pub fn foreign_entity(entity: Entity, world: WorldId) -> Self {
        Self::new(ErrorKind::ForeignEntity { entity, world })
    }

    /// Creates a snapshot error.
    #[must_use]
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Snapshot(message.into()))
    }

    /// Returns true for any not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Something requested does not exist.
    #[error("not found: {0}")]
    NotFound(Missing),

    /// An exclusive relation accessor found more than one target.
    #[error("relation {key:?} of {origin:?} has {count} targets, expected one")]
    AmbiguousRelation {
        /// The origin entity.
        origin: Entity,
        /// The relation key read.
        key: RelationKey,
        /// How many targets were found.
        count: usize,
    },

    /// The query cannot be evaluated.
    #[error("invalid query: {0}")]
    InvalidQuery(QueryProblem),

    /// A data-model invariant does not hold.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The entity belongs to another World.
    #[error("entity {entity:?} does not belong to world {world:?}")]
    ForeignEntity {
        /// The entity used.
        entity: Entity,
        /// The World it was used with.
        world: WorldId,
    },

    /// Persistence input could not be restored.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// What a not-found error failed to find.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Missing {
    /// Component on an entity.
    #[error("component {key} on {entity:?}")]
    Component {
        /// The entity queried.
        entity: Entity,
        /// The key looked up.
        key: ComponentKey,
    },
    /// Tag on an entity.
    #[error("tag {tag:?} on {entity:?}")]
    Tag {
        /// The entity queried.
        entity: Entity,
        /// The tag looked up.
        tag: Value,
    },
    /// Target of a relation.
    #[error("target of {key:?} from {origin:?}")]
    RelationTarget {
        /// The origin entity.
        origin: Entity,
        /// The relation key.
        key: RelationKey,
    },
    /// Component carried by a relation.
    #[error("relation component {key} from {origin:?} to {target:?}")]
    RelationComponent {
        /// The origin entity.
        origin: Entity,
        /// The component key.
        key: ComponentKey,
        /// The target entity.
        target: Entity,
    },
    /// Entity with the given uid.
    #[error("entity with uid {0:?}")]
    Uid(Value),
}

/// Why a query was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryProblem {
    /// Neither inclusions nor exclusions.
    #[error("query has no terms")]
    NoInclusions,
    /// Exclusions with nothing to exclude from.
    #[error("query only excludes, there is nothing to exclude from")]
    ExclusionOnly,
    /// The same atom is both required and excluded.
    #[error("query requires and excludes {0}")]
    Contradiction(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation that failed.
    pub operation: Option<String>,
    /// Entities walked before the failure, oldest first.
    pub path: Vec<Entity>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Appends a step to the entity path.
    #[must_use]
    pub fn with_step(mut self, entity: Entity) -> Self {
        self.path.push(entity);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = &self.operation {
            write!(f, "in {op}")?;
        }
        if !self.path.is_empty() {
            write!(f, " via")?;
            for entity in &self.path {
                write!(f, " {entity}")?;
            }
        }
        Ok(())
    }
}
