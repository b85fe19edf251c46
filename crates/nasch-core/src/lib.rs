//! `nasch-core` — foundational types for the `nasch` traffic simulator.
//!
//! This crate is a dependency of every other `nasch-*` crate.  It has no
//! `nasch-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`cell`]      | `Cell`: empty, or a car with a velocity                  |
//! | [`road`]      | `Road`, the circular lane                                |
//! | [`config`]    | `RunConfig` and its defaults                              |
//! | [`ids`]       | `UnitId`                                                  |
//! | [`rng`]       | `UnitRng` (per execution unit), `SimRng` (global)         |
//! | [`rule`]      | Nagel-Schreckenberg rule evaluator                        |
//! | [`segment`]   | `Segment` and the partitioner                             |
//! | [`update`]    | `PartialUpdate`, per-segment evaluation, merge            |
//! | [`error`]     | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                                     |
//! |---------|----------------------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all wire-visible types (used by `nasch-net`) |

pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod road;
pub mod rule;
pub mod segment;
pub mod update;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::Cell;
pub use config::{DEFAULT_P_SLOWDOWN, DEFAULT_SEED, DEFAULT_V_MAX, RunConfig};
pub use error::{CoreError, CoreResult};
pub use ids::UnitId;
pub use rng::{SimRng, UnitRng};
pub use road::Road;
pub use rule::{Move, RuleParams};
pub use segment::{Segment, partition};
pub use update::{Merged, PartialUpdate, compute_segment, merge};
