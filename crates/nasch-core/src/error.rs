//! Core error type.
//!
//! Higher crates wrap `CoreError` as one variant of their own enums via
//! `#[from]`.

use thiserror::Error;

/// The error type for `nasch-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot split a road of length {road_length} across {num_units} units")]
    Partition {
        road_length: usize,
        num_units:   usize,
    },

    #[error("destination {destination} is outside a road of length {road_length}")]
    DestinationOutOfRange {
        destination: usize,
        road_length: usize,
    },

    #[error("cell {index} holds velocity {velocity}, above v_max {v_max}")]
    VelocityOutOfRange {
        index:    usize,
        velocity: u8,
        v_max:    u8,
    },

    #[error("road length {got} does not match configured length {expected}")]
    RoadLengthMismatch {
        expected: usize,
        got:      usize,
    },
}

/// Shorthand result type for all `nasch-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
