//! The per-unit work of one round.

use nasch_core::{PartialUpdate, Road, RuleParams, Segment, UnitRng, compute_segment};

use crate::SimResult;

/// One execution unit's side of the round protocol.
///
/// An executor owns a fixed [`Segment`] for the whole run.  Each round it is
/// handed a read-only view of the complete road and must return the update
/// for the cars whose source index lies in its segment.  Implementations may
/// compute locally ([`LocalExecutor`]) or delegate to a remote peer.
pub trait SegmentExecutor: Send {
    /// The segment this unit owns.
    fn segment(&self) -> Segment;

    /// Produce the partial update for round `step` from `road`.
    fn compute(&mut self, step: u64, road: &Road) -> SimResult<PartialUpdate>;

    /// Called exactly once when the unit leaves the run.  `completed` is
    /// `false` if the run was abandoned.
    fn finish(&mut self, _completed: bool) -> SimResult<()> {
        Ok(())
    }
}

/// Evaluates the rule in-process with a unit-local RNG.
pub struct LocalExecutor {
    segment: Segment,
    params:  RuleParams,
    rng:     UnitRng,
}

impl LocalExecutor {
    /// The RNG is derived from `seed` and the segment owner.
    pub fn new(segment: Segment, params: RuleParams, seed: u64) -> Self {
        Self {
            segment,
            params,
            rng: UnitRng::new(seed, segment.owner),
        }
    }
}

impl SegmentExecutor for LocalExecutor {
    fn segment(&self) -> Segment {
        self.segment
    }

    fn compute(&mut self, _step: u64, road: &Road) -> SimResult<PartialUpdate> {
        Ok(compute_segment(road, &self.segment, self.params, &mut self.rng))
    }
}
