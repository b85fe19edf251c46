//! Nagel-Schreckenberg update rule for a single car.
//!
//! ```text
//! gap  = distance to the next car ahead (wrap-around), capped at v_max + 2
//! v'   = min(v + 1, v_max)              acceleration
//! v'   = min(v', gap - 1)               collision avoidance
//! v'   = v' - 1  with prob. p_slowdown  randomization (only if v' > 0)
//! dest = (i + v') mod len               movement
//! ```
//!
//! The rule reads the whole road but only the evaluated car's own RNG, so a
//! unit may evaluate any subset of cars as long as it sees the complete
//! previous-step road.

use crate::{Road, UnitRng};

/// The two model constants the rule depends on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RuleParams {
    pub v_max:      u8,
    pub p_slowdown: f64,
}

/// The outcome of evaluating one car.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub source:      usize,
    pub destination: usize,
    pub velocity:    u8,
}

/// Distance from `i` to the next occupied cell ahead.
///
/// Scans `(i + d) mod len` for `d = 1, 2, …` and stops at the first occupied
/// cell or once `d` exceeds `v_max + 1`; beyond that bound the exact gap no
/// longer influences the rule.  On a road with a single car the scan wraps
/// back onto the car itself.
pub fn gap_ahead(road: &Road, i: usize, v_max: u8) -> usize {
    let len = road.len();
    let limit = v_max as usize + 1;
    let mut d = 1;
    while road.get((i + d) % len).is_empty() {
        d += 1;
        if d > limit {
            break;
        }
    }
    d
}

/// Evaluate the car at `i`.
///
/// Returns `None` if the cell is empty.  Consumes exactly one draw from `rng`
/// when the post-avoidance velocity is positive, and none otherwise, so with
/// `p_slowdown = 0` the result is a pure function of `(road, i, v_max)`.
pub fn evaluate(road: &Road, i: usize, params: RuleParams, rng: &mut UnitRng) -> Option<Move> {
    let v = road.get(i).velocity()?;
    let gap = gap_ahead(road, i, params.v_max);

    let mut next = v.saturating_add(1).min(params.v_max);

    let room = u8::try_from(gap - 1).unwrap_or(u8::MAX);
    next = next.min(room);

    if next > 0 && rng.random::<f64>() < params.p_slowdown {
        next -= 1;
    }

    Some(Move {
        source:      i,
        destination: (i + next as usize) % road.len(),
        velocity:    next,
    })
}
