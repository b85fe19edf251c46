//! `nasch-sim` — round drivers for the nasch traffic simulator.
//!
//! # Two-barrier round
//!
//! ```text
//! for step in 0..sim_steps:
//!   ① Compute:   every unit evaluates its own segment against the shared
//!                road (read-only) and deposits a PartialUpdate in its slot.
//!   ② computed:  PhaseBarrier: all updates are in.
//!   ③ Commit:    unit 0 merges the slots in partition order and overwrites
//!                the shared road; everyone else waits.
//!   ④ committed: PhaseBarrier: the new road is visible to all units.
//! ```
//!
//! No unit reads round `t + 1`'s road before ④ of round `t`, and no unit
//! writes anything but its own slot until ②.
//!
//! # Runners
//!
//! | Function                   | Execution units                             |
//! |----------------------------|---------------------------------------------|
//! | [`run_sequential`]         | the calling thread, one segment             |
//! | [`run_shared_memory`]      | one scoped thread per [`LocalExecutor`]     |
//! | [`run_lockstep`]           | any [`SegmentExecutor`]s (used by `nasch-net`) |

pub mod barrier;
pub mod error;
pub mod executor;
pub mod lockstep;
pub mod observer;
pub mod report;
pub mod runner;


pub use barrier::{BarrierError, BarrierWait, PhaseBarrier, RoundPhases};
pub use error::{SimError, SimResult};
pub use executor::{LocalExecutor, SegmentExecutor};
pub use lockstep::{LockstepOptions, LockstepOutcome, run_lockstep};
pub use observer::{NoopObserver, SimObserver};
pub use report::{RunReport, Strategy};
pub use runner::{
    run_sequential, run_sequential_with_road, run_shared_memory, run_shared_memory_with_road,
};
