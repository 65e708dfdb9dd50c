//! Entity handles scoped to the World that issued them.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_WORLD: AtomicU32 = AtomicU32::new(1);

/// Identifies one World instance for the lifetime of the process.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct WorldId(u32);

impl WorldId {
    /// Allocates an id no other World has used.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_WORLD.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorldId({})", self.0)
    }
}

/// Handle to one entity of one World.
///
/// Handles are plain copyable values. Equal handles always denote the same
/// entity because the identity table hands out exactly one index per uid.
/// A handle is only meaningful to the World whose [`WorldId`] it carries.
///
/// # Layout
/// - `world`: the issuing World
/// - `index`: dense index into that World's identity table
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Entity {
    world: WorldId,
    index: u32,
}

impl Entity {
    /// Creates a handle. Only identity tables should need this.
    #[must_use]
    pub const fn new(world: WorldId, index: u32) -> Self {
        Self { world, index }
    }

    /// The World that issued this handle.
    #[must_use]
    pub const fn world(self) -> WorldId {
        self.world
    }

    /// Index into the issuing World's identity table.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}@{})", self.index, self.world.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.index)
    }
}

/// Read-only set of entities, as returned by queries.
///
/// Cloning is O(1) and mutation of a clone never affects the original, so a
/// cached result can be handed out without a defensive copy.
pub type EntitySet = im::HashSet<Entity>;
