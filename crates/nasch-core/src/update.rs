//! Partial updates and the merge into the next road.
//!
//! # Merge policy
//!
//! The next road starts empty.  Updates are applied in the order given
//! (runners pass them in ascending partition index) and, within one update,
//! in ascending destination index.  If two cars land on the same cell the
//! later write wins.  [`Merged::collisions`] counts every lost car: overwrites
//! between updates during the merge plus the overwrites each unit already
//! recorded inside its own update.  A consistent road never produces a
//! collision; the count exists so runners can surface a corrupted state
//! instead of silently losing cars.

use std::collections::BTreeMap;

use crate::{Cell, CoreError, CoreResult, Road, RuleParams, Segment, UnitId, UnitRng, rule};

/// One unit's contribution to the next road: destination index → velocity.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialUpdate {
    pub owner:  UnitId,
    moves:      BTreeMap<usize, u8>,
    /// Cars of this unit that landed on a destination already taken by
    /// another car of this unit.
    overwrites: usize,
}

impl PartialUpdate {
    pub fn new(owner: UnitId) -> Self {
        Self { owner, moves: BTreeMap::new(), overwrites: 0 }
    }

    /// Record a car arriving at `destination`.  Returns the velocity it
    /// replaced, if another car of this unit already landed there; that
    /// replacement is counted in [`overwrites`](Self::overwrites).
    pub fn insert(&mut self, destination: usize, velocity: u8) -> Option<u8> {
        let replaced = self.moves.insert(destination, velocity);
        if replaced.is_some() {
            self.overwrites += 1;
        }
        replaced
    }

    pub fn overwrites(&self) -> usize {
        self.overwrites
    }

    pub fn get(&self, destination: usize) -> Option<u8> {
        self.moves.get(&destination).copied()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Iterate `(destination, velocity)` in ascending destination order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.moves.iter().map(|(&d, &v)| (d, v))
    }
}

/// Evaluate every car whose source index lies in `segment`.
///
/// Gap scans may read past the segment end; only the result is confined to
/// this unit.
pub fn compute_segment(
    road:    &Road,
    segment: &Segment,
    params:  RuleParams,
    rng:     &mut UnitRng,
) -> PartialUpdate {
    let mut update = PartialUpdate::new(segment.owner);
    for i in segment.indices() {
        if let Some(m) = rule::evaluate(road, i, params, rng) {
            update.insert(m.destination, m.velocity);
        }
    }
    update
}

/// The committed next road plus how many writes overwrote an earlier car.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Merged {
    pub road:       Road,
    pub collisions: usize,
}

/// Build the next road of length `road_length` from `updates`.
///
/// Fails if any destination lies outside the road or any velocity exceeds
/// `v_max`, which only happens when an update was produced against a
/// different road or configuration.
pub fn merge<'a, I>(road_length: usize, v_max: u8, updates: I) -> CoreResult<Merged>
where
    I: IntoIterator<Item = &'a PartialUpdate>,
{
    let mut road = Road::empty(road_length);
    let mut collisions = 0;
    for update in updates {
        collisions += update.overwrites();
        for (destination, velocity) in update.iter() {
            if destination >= road_length {
                return Err(CoreError::DestinationOutOfRange { destination, road_length });
            }
            if velocity > v_max {
                return Err(CoreError::VelocityOutOfRange { index: destination, velocity, v_max });
            }
            if road.get(destination).is_occupied() {
                collisions += 1;
            }
            road.set(destination, Cell::car(velocity));
        }
    }
    Ok(Merged { road, collisions })
}
