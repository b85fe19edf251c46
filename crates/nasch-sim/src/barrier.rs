//! Cyclic rendezvous for a fixed number of execution units.
//!
//! Unlike `std::sync::Barrier`, a [`PhaseBarrier`] can be aborted and its
//! waits can be bounded by a timeout.  Either event poisons the barrier for
//! every participant: all current and future waits return an error, so one
//! failed unit releases its peers instead of stranding them mid-round.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BarrierError {
    #[error("aborted by a participant")]
    Aborted,

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Result of a successful wait.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BarrierWait {
    is_leader: bool,
}

impl BarrierWait {
    /// `true` for exactly one participant per round: the last to arrive.
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }
}

struct State {
    arrived:    usize,
    generation: u64,
    aborted:    bool,
}

/// A reusable barrier for `parties` participants.
pub struct PhaseBarrier {
    name:    &'static str,
    parties: usize,
    state:   Mutex<State>,
    cvar:    Condvar,
}

impl PhaseBarrier {
    /// `parties` of zero is treated as one.
    pub fn new(name: &'static str, parties: usize) -> Self {
        Self {
            name,
            parties: parties.max(1),
            state:   Mutex::new(State { arrived: 0, generation: 0, aborted: false }),
            cvar:    Condvar::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until all participants of the current round have arrived.
    pub fn wait(&self) -> Result<BarrierWait, BarrierError> {
        self.wait_for(None)
    }

    /// Like [`wait`](Self::wait), but give up after `timeout`.  A timeout
    /// aborts the barrier for everyone.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<BarrierWait, BarrierError> {
        self.wait_for(Some(timeout))
    }

    /// Wait with an optional bound.
    pub fn wait_for(&self, timeout: Option<Duration>) -> Result<BarrierWait, BarrierError> {
        let mut state = self.lock();
        if state.aborted {
            return Err(BarrierError::Aborted);
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(BarrierWait { is_leader: true });
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            // A release that happened before an abort still counts.
            if state.generation != generation {
                return Ok(BarrierWait { is_leader: false });
            }
            if state.aborted {
                return Err(BarrierError::Aborted);
            }
            match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.aborted = true;
                        self.cvar.notify_all();
                        return Err(BarrierError::TimedOut(timeout));
                    }
                    state = self
                        .cvar
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
                _ => {
                    state = self.cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Release every waiter with [`BarrierError::Aborted`] and fail all
    /// future waits.  Idempotent.
    pub fn abort(&self) {
        let mut state = self.lock();
        if !state.aborted {
            state.aborted = true;
            self.cvar.notify_all();
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The two rendezvous points of every simulation step.
pub struct RoundPhases {
    /// All partial updates for the step have been deposited.
    pub computed:  PhaseBarrier,
    /// The merged road has been committed and may be read.
    pub committed: PhaseBarrier,
}

impl RoundPhases {
    pub fn new(parties: usize) -> Self {
        Self {
            computed:  PhaseBarrier::new("computed", parties),
            committed: PhaseBarrier::new("committed", parties),
        }
    }

    /// Abort both barriers.
    pub fn abort(&self) {
        self.computed.abort();
        self.committed.abort();
    }
}
