//! The two-barrier round engine shared by every multi-unit strategy.
//!
//! Each executor runs on its own scoped thread.  Shared state is limited to a
//! [`RoundContext`]: the committed road behind an `RwLock` (read by all units
//! during compute, written only by the merger between the two barriers), one
//! output slot per unit, and the [`RoundPhases`] barriers.  Unit 0 is the
//! designated merger and the only thread that calls the observer.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use std::thread;
use std::time::Duration;

use nasch_core::{PartialUpdate, Road, UnitId, merge};
use tracing::{debug, warn};

use crate::{RoundPhases, SegmentExecutor, SimError, SimObserver, SimResult};

/// Tuning knobs for [`run_lockstep`].
#[derive(Clone, Debug, Default)]
pub struct LockstepOptions {
    /// Upper bound on any single barrier wait.  `None` waits indefinitely;
    /// executors are then responsible for bounding their own I/O.
    pub barrier_timeout: Option<Duration>,
}

/// Final state of a completed lockstep run.
#[derive(Clone, Debug)]
pub struct LockstepOutcome {
    pub road:       Road,
    pub steps:      u64,
    pub collisions: usize,
}

struct RoundContext {
    road:    RwLock<Road>,
    slots:   Vec<Mutex<Option<PartialUpdate>>>,
    phases:  RoundPhases,
    v_max:   u8,
    timeout: Option<Duration>,
}

impl RoundContext {
    fn read_road(&self) -> RwLockReadGuard<'_, Road> {
        self.road.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, index: usize) -> MutexGuard<'_, Option<PartialUpdate>> {
        self.slots[index].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge every slot in partition order and publish the result.  Only
    /// called between the `computed` and `committed` barriers.
    fn commit<O: SimObserver>(&self, step: u64, observer: &mut O) -> SimResult<usize> {
        let updates: Vec<PartialUpdate> =
            (0..self.slots.len()).filter_map(|k| self.slot(k).take()).collect();

        let mut road = self.road.write().unwrap_or_else(PoisonError::into_inner);
        let merged = merge(road.len(), self.v_max, &updates)?;
        if merged.collisions > 0 {
            warn!(step, collisions = merged.collisions, "merge overwrote cars");
        }
        *road = merged.road;
        debug!(step, cars = road.occupied_count(), "step committed");

        observer.on_step_end(step, &road);
        Ok(merged.collisions)
    }
}

/// Aborts both barriers if the owning unit unwinds, so a panicking executor
/// cannot strand its peers.
struct AbortOnUnwind<'a>(&'a RoundPhases);

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

/// Advance `road` by `steps` rounds using one thread per executor.
///
/// `executors[k]` must own the segment of `UnitId(k)`.  If any unit fails,
/// both barriers are aborted, every executor's `finish(false)` runs, and the
/// originating error is returned.
pub fn run_lockstep<E, O>(
    road:      Road,
    v_max:     u8,
    executors: Vec<E>,
    steps:     u64,
    options:   &LockstepOptions,
    observer:  &mut O,
) -> SimResult<LockstepOutcome>
where
    E: SegmentExecutor,
    O: SimObserver + Send,
{
    if executors.is_empty() {
        return Err(SimError::NoUnits);
    }
    for (position, executor) in executors.iter().enumerate() {
        let owner = executor.segment().owner;
        if owner.index() != position {
            return Err(SimError::UnitOrder { position, owner });
        }
    }

    let units = executors.len();
    let ctx = RoundContext {
        road:    RwLock::new(road),
        slots:   (0..units).map(|_| Mutex::new(None)).collect(),
        phases:  RoundPhases::new(units),
        v_max,
        timeout: options.barrier_timeout,
    };

    let mut merger = Some(&mut *observer);
    let results: Vec<SimResult<usize>> = thread::scope(|s| {
        let handles: Vec<_> = executors
            .into_iter()
            .map(|executor| {
                let observer = if executor.segment().owner.index() == 0 { merger.take() } else { None };
                let ctx = &ctx;
                s.spawn(move || run_unit(ctx, executor, steps, observer))
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(k, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(SimError::UnitPanicked(UnitId(k as u32))))
            })
            .collect()
    });

    let mut collisions = 0;
    let mut aborted = None;
    for result in results {
        match result {
            Ok(c) => collisions += c,
            Err(e) if e.is_abort() => {
                aborted.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    if let Some(e) = aborted {
        return Err(e);
    }

    let road = ctx.road.into_inner().unwrap_or_else(PoisonError::into_inner);
    observer.on_sim_end(steps, &road);
    Ok(LockstepOutcome { road, steps, collisions })
}

fn run_unit<E, O>(
    ctx:          &RoundContext,
    mut executor: E,
    steps:        u64,
    mut observer: Option<&mut O>,
) -> SimResult<usize>
where
    E: SegmentExecutor,
    O: SimObserver,
{
    let _guard = AbortOnUnwind(&ctx.phases);
    let unit = executor.segment().owner;

    match drive_unit(ctx, &mut executor, steps, &mut observer) {
        Ok(collisions) => {
            executor.finish(true)?;
            Ok(collisions)
        }
        Err(e) => {
            ctx.phases.abort();
            if !e.is_abort() {
                warn!(%unit, error = %e, "unit failed; abandoning run");
            }
            if let Err(finish) = executor.finish(false) {
                debug!(%unit, error = %finish, "finish after failure");
            }
            Err(e)
        }
    }
}

fn drive_unit<E, O>(
    ctx:      &RoundContext,
    executor: &mut E,
    steps:    u64,
    observer: &mut Option<&mut O>,
) -> SimResult<usize>
where
    E: SegmentExecutor,
    O: SimObserver,
{
    let slot = executor.segment().owner.index();
    let mut collisions = 0;

    for step in 0..steps {
        // ── Compute: read-only access to the committed road ───────────────
        let update = {
            let road = ctx.read_road();
            executor.compute(step, &road)?
        };
        *ctx.slot(slot) = Some(update);

        ctx.phases.computed.wait_for(ctx.timeout)?;

        // ── Commit: merger only, everyone else is parked on `committed` ───
        if let Some(observer) = observer.as_deref_mut() {
            collisions += ctx.commit(step, observer)?;
        }

        ctx.phases.committed.wait_for(ctx.timeout)?;
    }

    Ok(collisions)
}
