//! Plain data rows written by output backends.

use nasch_core::RunConfig;

/// Timing of one complete run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResultRow {
    /// Human-readable strategy label, e.g. `"shared-memory (4 units)"`.
    pub strategy:     String,
    pub road_length:  usize,
    pub density:      f64,
    pub sim_steps:    u64,
    pub v_max:        u8,
    pub p_slowdown:   f64,
    pub num_units:    usize,
    pub elapsed_secs: f64,
}

impl RunResultRow {
    /// Copy the run parameters out of `config`.
    pub fn new(strategy: impl Into<String>, config: &RunConfig, elapsed_secs: f64) -> Self {
        Self {
            strategy: strategy.into(),
            road_length: config.road_length,
            density: config.density,
            sim_steps: config.sim_steps,
            v_max: config.v_max,
            p_slowdown: config.p_slowdown,
            num_units: config.num_units,
            elapsed_secs,
        }
    }
}
