//! Handles to pooled entities

use std::fmt;

/// Identifies one activation of a pooled entity.
///
/// A handle pairs a slot index with the slot's generation. The generation
/// changes every time the entity leaves the active state, so a handle kept
/// after `recycle` no longer resolves, even if the same slot is later
/// handed out again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle {
    index: usize,
    generation: u32,
}

impl EntityHandle {
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        Self {
            index,
            generation,
        }
    }

    /// Slot index inside the owning pool.
    ///
    /// Two handles with the same index refer to the same entity instance,
    /// possibly across different activations.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityHandle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
