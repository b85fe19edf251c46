//! What a runner hands back to the harness.

use std::fmt;
use std::time::Duration;

use nasch_core::Road;

/// The three execution strategies compared by the harness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Sequential,
    SharedMemory,
    Distributed,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::SharedMemory, Strategy::Distributed];

    /// Result-table label, e.g. `"shared-memory (4 units)"`.
    pub fn label(self, num_units: usize) -> String {
        match self {
            Strategy::Sequential => self.to_string(),
            _ => format!("{self} ({num_units} units)"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Sequential   => "sequential",
            Strategy::SharedMemory => "shared-memory",
            Strategy::Distributed  => "distributed",
        })
    }
}

/// Outcome of one completed run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Wall time of the stepping loop only (excludes road setup and, for the
    /// networked variant, the accept phase).
    pub elapsed:      Duration,
    pub steps:        u64,
    pub initial_cars: usize,
    pub final_road:   Road,
    /// Merge overwrites summed over all steps.  Zero for a consistent road.
    pub collisions:   usize,
}

impl RunReport {
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
