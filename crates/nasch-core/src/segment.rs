//! Domain decomposition of the road into per-unit segments.

use std::ops::Range;

use crate::{CoreError, CoreResult, UnitId};

/// A contiguous half-open index range `[start, end)` owned by one unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub owner: UnitId,
    pub start: usize,
    pub end:   usize,
}

impl Segment {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// The owned source indices, in ascending order.
    #[inline]
    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `[0, road_length)` into `num_units` contiguous segments.
///
/// `chunk = road_length / num_units`; unit `k` owns
/// `[k * chunk, (k + 1) * chunk)` and the last unit also absorbs the
/// remainder.  The result is ordered by owner and covers every index exactly
/// once.
pub fn partition(road_length: usize, num_units: usize) -> CoreResult<Vec<Segment>> {
    if num_units == 0 || num_units > road_length {
        return Err(CoreError::Partition { road_length, num_units });
    }
    let chunk = road_length / num_units;
    (0..num_units)
        .map(|k| {
            let owner = UnitId::try_from(k)
                .map_err(|_| CoreError::Partition { road_length, num_units })?;
            let start = k * chunk;
            let end = if k == num_units - 1 { road_length } else { (k + 1) * chunk };
            Ok(Segment { owner, start, end })
        })
        .collect()
}
