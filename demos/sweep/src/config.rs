//! Sweep parameters, optionally loaded from a JSON file.
//!
//! Every field has a default, so a partial file such as
//! `{ "sim_steps": 50, "distributed": { "units": [2] } }` is valid.

use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use nasch_core::{DEFAULT_P_SLOWDOWN, DEFAULT_SEED, DEFAULT_V_MAX, RunConfig};
use nasch_sim::Strategy;

/// Axes swept for one strategy.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Grid {
    pub road_lengths: Vec<usize>,
    pub densities:    Vec<f64>,
    /// Execution units.  Ignored for the sequential strategy.
    pub units:        Vec<usize>,
}

impl Grid {
    fn new(road_lengths: &[usize], densities: &[f64], units: &[usize]) -> Self {
        Self {
            road_lengths: road_lengths.to_vec(),
            densities:    densities.to_vec(),
            units:        units.to_vec(),
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(&[1_000], &[0.1], &[2])
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub output_dir:        PathBuf,
    pub sim_steps:         u64,
    pub v_max:             u8,
    pub p_slowdown:        f64,
    pub seed:              u64,
    pub sequential:        Grid,
    pub shared_memory:     Grid,
    pub distributed:       Grid,
    /// When set, distributed runs listen here and wait for separately
    /// started `peer` processes instead of spawning in-process peers.
    pub external_peers:    Option<SocketAddr>,
    /// Upper bound on a single peer read; `None` waits forever.
    pub peer_timeout_secs: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            output_dir:        PathBuf::from("output/sweep"),
            sim_steps:         200,
            v_max:             DEFAULT_V_MAX,
            p_slowdown:        DEFAULT_P_SLOWDOWN,
            seed:              DEFAULT_SEED,
            sequential:        Grid::new(&[1_000, 5_000, 10_000, 20_000], &[0.1, 0.3, 0.5], &[1]),
            shared_memory:     Grid::new(&[1_000, 5_000, 10_000, 20_000], &[0.1, 0.3, 0.5], &[2, 4, 8]),
            distributed:       Grid::new(&[1_000, 5_000, 10_000], &[0.1, 0.3], &[2, 4]),
            external_peers:    None,
            peer_timeout_secs: Some(30),
        }
    }
}

impl SweepConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))
    }

    pub fn peer_timeout(&self) -> Option<Duration> {
        self.peer_timeout_secs.map(Duration::from_secs)
    }

    /// Every run for `strategy`, outermost axis first: units, road length,
    /// density.
    pub fn runs(&self, strategy: Strategy) -> Vec<RunConfig> {
        let (grid, units) = match strategy {
            Strategy::Sequential   => (&self.sequential, vec![1]),
            Strategy::SharedMemory => (&self.shared_memory, self.shared_memory.units.clone()),
            Strategy::Distributed  => (&self.distributed, self.distributed.units.clone()),
        };

        let mut runs = Vec::new();
        for &n in &units {
            for &len in &grid.road_lengths {
                for &density in &grid.densities {
                    runs.push(
                        RunConfig::new(len, density, self.sim_steps, n)
                            .with_v_max(self.v_max)
                            .with_p_slowdown(self.p_slowdown)
                            .with_seed(self.seed),
                    );
                }
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_sizes() {
        let sweep = SweepConfig::default();
        assert_eq!(sweep.runs(Strategy::Sequential).len(), 12);
        assert_eq!(sweep.runs(Strategy::SharedMemory).len(), 36);
        assert_eq!(sweep.runs(Strategy::Distributed).len(), 12);
    }

    #[test]
    fn units_vary_slowest() {
        let sweep = SweepConfig::default();
        let runs = sweep.runs(Strategy::Distributed);
        assert!(runs[..6].iter().all(|r| r.num_units == 2));
        assert!(runs[6..].iter().all(|r| r.num_units == 4));
        assert_eq!((runs[0].road_length, runs[0].density), (1_000, 0.1));
        assert_eq!((runs[1].road_length, runs[1].density), (1_000, 0.3));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let sweep: SweepConfig =
            serde_json::from_str(r#"{ "sim_steps": 50, "distributed": { "units": [3] } }"#).unwrap();
        assert_eq!(sweep.sim_steps, 50);
        assert_eq!(sweep.distributed.units, [3]);
        assert_eq!(sweep.distributed.road_lengths, [1_000]);
        assert_eq!(sweep.v_max, DEFAULT_V_MAX);
        assert!(sweep.runs(Strategy::Distributed).iter().all(|r| r.sim_steps == 50 && r.num_units == 3));
    }
}
