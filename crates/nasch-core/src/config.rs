//! Run configuration.

use crate::{CoreError, CoreResult, RuleParams};

/// Default maximum velocity (cells per step).
pub const DEFAULT_V_MAX: u8 = 5;

/// Default probability of a random slowdown.
pub const DEFAULT_P_SLOWDOWN: f64 = 0.3;

/// Default master RNG seed.
pub const DEFAULT_SEED: u64 = 42;

/// Immutable parameters of a single simulation run.
///
/// Created by the harness, consumed by a runner, and (in the networked
/// variant) shipped to every peer before the first step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Number of cells on the circular lane.
    pub road_length: usize,

    /// Fraction of cells occupied at start, in `[0, 1]`.
    pub density: f64,

    /// Number of rounds to simulate.
    pub sim_steps: u64,

    /// Number of execution units (threads or peers).  Ignored by the
    /// sequential runner.
    pub num_units: usize,

    /// Maximum velocity.  Must be in `1..255`.
    pub v_max: u8,

    /// Probability of a random slowdown, in `[0, 1]`.
    pub p_slowdown: f64,

    /// Master RNG seed.  Each unit derives its own stream from it.
    pub seed: u64,
}

impl RunConfig {
    /// A config with the default `v_max`, `p_slowdown` and seed.
    pub fn new(road_length: usize, density: f64, sim_steps: u64, num_units: usize) -> Self {
        Self {
            road_length,
            density,
            sim_steps,
            num_units,
            v_max:      DEFAULT_V_MAX,
            p_slowdown: DEFAULT_P_SLOWDOWN,
            seed:       DEFAULT_SEED,
        }
    }

    pub fn with_p_slowdown(mut self, p: f64) -> Self {
        self.p_slowdown = p;
        self
    }

    pub fn with_v_max(mut self, v_max: u8) -> Self {
        self.v_max = v_max;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of cars placed on the initial road (`floor(len * density)`).
    #[inline]
    pub fn num_cars(&self) -> usize {
        (self.road_length as f64 * self.density) as usize
    }

    #[inline]
    pub fn rule_params(&self) -> RuleParams {
        RuleParams { v_max: self.v_max, p_slowdown: self.p_slowdown }
    }

    /// Reject configurations no runner can execute.
    pub fn validate(&self) -> CoreResult<()> {
        if self.road_length == 0 {
            return Err(CoreError::Config("road_length must be positive".into()));
        }
        if self.num_units == 0 || self.num_units > self.road_length {
            return Err(CoreError::Partition {
                road_length: self.road_length,
                num_units:   self.num_units,
            });
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(CoreError::Config(format!("density {} outside [0, 1]", self.density)));
        }
        if !(0.0..=1.0).contains(&self.p_slowdown) {
            return Err(CoreError::Config(format!(
                "p_slowdown {} outside [0, 1]",
                self.p_slowdown
            )));
        }
        if self.v_max == 0 || self.v_max == u8::MAX {
            return Err(CoreError::Config(format!("v_max {} outside 1..255", self.v_max)));
        }
        Ok(())
    }
}
