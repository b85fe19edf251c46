//! Execution-unit identifier.

use std::fmt;

/// Index of an execution unit (thread or remote peer) within one run.
///
/// Unit `k` owns the `k`-th segment of the road.  The inner integer is `pub`
/// for direct construction; use [`index`](Self::index) to index `Vec`s.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl UnitId {
    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit{}", self.0)
    }
}

impl From<UnitId> for usize {
    #[inline(always)]
    fn from(id: UnitId) -> usize {
        id.0 as usize
    }
}

impl TryFrom<usize> for UnitId {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<UnitId, Self::Error> {
        u32::try_from(n).map(UnitId)
    }
}
