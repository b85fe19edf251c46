//! A single road cell.

use std::fmt;

/// One cell of the lane: either empty or holding a car with a velocity.
///
/// Stored as a single byte so a `Road` is a flat integer buffer.
/// `u8::MAX` is reserved as the empty sentinel, which is why `v_max` must stay
/// below 255.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
#[repr(transparent)]
pub struct Cell(u8);

impl Cell {
    /// The empty-cell sentinel.
    pub const EMPTY: Cell = Cell(u8::MAX);

    /// A cell occupied by a car moving at `velocity` cells per step.
    ///
    /// # Panics
    /// Panics in debug mode if `velocity` collides with the empty sentinel.
    #[inline]
    pub fn car(velocity: u8) -> Cell {
        debug_assert!(velocity != u8::MAX, "velocity {velocity} is the empty sentinel");
        Cell(velocity)
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.0 == u8::MAX
    }

    #[inline(always)]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    /// The car's velocity, or `None` for an empty cell.
    #[inline(always)]
    pub fn velocity(self) -> Option<u8> {
        if self.is_empty() { None } else { Some(self.0) }
    }
}

impl Default for Cell {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<Option<u8>> for Cell {
    fn from(v: Option<u8>) -> Self {
        v.map_or(Cell::EMPTY, Cell::car)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.velocity() {
            None    => f.write_str("."),
            Some(v) => write!(f, "{v}"),
        }
    }
}
