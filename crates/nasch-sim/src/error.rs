use nasch_core::{CoreError, UnitId};
use thiserror::Error;

use crate::BarrierError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("phase barrier: {0}")]
    Barrier(#[from] BarrierError),

    #[error("{unit} failed: {source}")]
    Unit {
        unit:   UnitId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0} panicked")]
    UnitPanicked(UnitId),

    #[error("executor at position {position} owns the segment of {owner}")]
    UnitOrder {
        position: usize,
        owner:    UnitId,
    },

    #[error("no execution units")]
    NoUnits,
}

impl SimError {
    /// `true` for the secondary error a unit reports when a peer aborted the
    /// round, as opposed to the failure that caused the abort.
    pub fn is_abort(&self) -> bool {
        matches!(self, SimError::Barrier(BarrierError::Aborted))
    }
}

pub type SimResult<T> = Result<T, SimError>;
