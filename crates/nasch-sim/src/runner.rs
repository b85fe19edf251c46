//! Sequential and shared-memory entry points.

use std::time::Instant;

use nasch_core::{
    Road, RunConfig, Segment, SimRng, UnitId, UnitRng, compute_segment, merge, partition,
};
use tracing::info;

use crate::{
    LocalExecutor, LockstepOptions, NoopObserver, RunReport, SimObserver, SimResult, run_lockstep,
};

// ── Sequential ────────────────────────────────────────────────────────────────

/// Run `config` on the calling thread from a freshly seeded random road.
///
/// `config.num_units` is ignored.
pub fn run_sequential(config: &RunConfig) -> SimResult<RunReport> {
    let config = RunConfig { num_units: 1, ..config.clone() };
    config.validate()?;
    let road = Road::random(&config, &mut SimRng::new(config.seed));
    run_sequential_with_road(&config, road, &mut NoopObserver)
}

/// Run `config` on the calling thread starting from `road`.
///
/// The whole road is one segment owned by `UnitId(0)`, so the random stream
/// matches a single-unit shared-memory run with the same seed.
/// `config.num_units` is ignored; everything else is validated.
pub fn run_sequential_with_road<O: SimObserver>(
    config:   &RunConfig,
    mut road: Road,
    observer: &mut O,
) -> SimResult<RunReport> {
    RunConfig { num_units: 1, ..config.clone() }.validate()?;
    road.check(config.road_length, config.v_max)?;

    let segment = Segment { owner: UnitId(0), start: 0, end: road.len() };
    let params = config.rule_params();
    let mut rng = UnitRng::new(config.seed, segment.owner);
    let initial_cars = road.occupied_count();

    info!(
        road_length = config.road_length,
        cars = initial_cars,
        steps = config.sim_steps,
        "sequential run starting"
    );

    let start = Instant::now();
    let mut collisions = 0;
    for step in 0..config.sim_steps {
        let update = compute_segment(&road, &segment, params, &mut rng);
        let merged = merge(road.len(), config.v_max, [&update])?;
        collisions += merged.collisions;
        road = merged.road;
        observer.on_step_end(step, &road);
    }
    let elapsed = start.elapsed();
    observer.on_sim_end(config.sim_steps, &road);

    info!(elapsed_secs = elapsed.as_secs_f64(), "sequential run finished");
    Ok(RunReport {
        elapsed,
        steps: config.sim_steps,
        initial_cars,
        final_road: road,
        collisions,
    })
}

// ── Shared memory ─────────────────────────────────────────────────────────────

/// Run `config` with `config.num_units` threads from a freshly seeded random
/// road.
pub fn run_shared_memory(config: &RunConfig) -> SimResult<RunReport> {
    config.validate()?;
    let road = Road::random(config, &mut SimRng::new(config.seed));
    run_shared_memory_with_road(config, road, &mut NoopObserver)
}

/// Run `config` with `config.num_units` threads starting from `road`.
pub fn run_shared_memory_with_road<O: SimObserver + Send>(
    config:   &RunConfig,
    road:     Road,
    observer: &mut O,
) -> SimResult<RunReport> {
    config.validate()?;
    road.check(config.road_length, config.v_max)?;

    let params = config.rule_params();
    let executors: Vec<LocalExecutor> = partition(config.road_length, config.num_units)?
        .into_iter()
        .map(|segment| LocalExecutor::new(segment, params, config.seed))
        .collect();
    let initial_cars = road.occupied_count();

    info!(
        road_length = config.road_length,
        cars = initial_cars,
        steps = config.sim_steps,
        units = config.num_units,
        "shared-memory run starting"
    );

    let start = Instant::now();
    let outcome = run_lockstep(
        road,
        config.v_max,
        executors,
        config.sim_steps,
        &LockstepOptions::default(),
        observer,
    )?;
    let elapsed = start.elapsed();

    info!(elapsed_secs = elapsed.as_secs_f64(), "shared-memory run finished");
    Ok(RunReport {
        elapsed,
        steps: outcome.steps,
        initial_cars,
        final_road: outcome.road,
        collisions: outcome.collisions,
    })
}
