//! sweep — wall-clock comparison of the three NaSch execution strategies.
//!
//! Runs every configured grid point under the sequential, shared-memory and
//! distributed strategies and appends one row per run to
//! `<output_dir>/results.csv`.
//!
//! ```text
//! sweep                 # built-in grids
//! sweep sweep.json      # grids from a JSON file (see config.rs)
//! RUST_LOG=debug sweep  # per-round logging
//! ```

mod config;

use std::net::SocketAddr;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use nasch_core::{Road, RunConfig, SimRng};
use nasch_net::{Coordinator, CoordinatorConfig, run_distributed_local_with_road};
use nasch_output::{CsvWriter, OutputWriter, RunResultRow};
use nasch_sim::{RunReport, Strategy, run_sequential, run_shared_memory};

use config::SweepConfig;

// ── Execution ─────────────────────────────────────────────────────────────────

fn execute(strategy: Strategy, run: &RunConfig, sweep: &SweepConfig) -> Result<RunReport> {
    let report = match strategy {
        Strategy::Sequential   => run_sequential(run)?,
        Strategy::SharedMemory => run_shared_memory(run)?,
        Strategy::Distributed  => {
            run.validate()?;
            let road = Road::random(run, &mut SimRng::new(run.seed));
            match sweep.external_peers {
                Some(addr) => {
                    let options = CoordinatorConfig::new(addr).with_peer_timeout(sweep.peer_timeout());
                    println!("  waiting for {} peer processes on {addr}", run.num_units);
                    Coordinator::bind(run.clone(), options)?.run(road)?
                }
                None => {
                    let options = CoordinatorConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)))
                        .with_peer_timeout(sweep.peer_timeout());
                    run_distributed_local_with_road(run, road, options)?
                }
            }
        }
    };
    Ok(report)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();

    let sweep = match std::env::args_os().nth(1) {
        Some(path) => SweepConfig::load(Path::new(&path))?,
        None => SweepConfig::default(),
    };

    println!("=== sweep — Nagel-Schreckenberg strategy timings ===");
    println!(
        "Steps: {}  |  v_max: {}  |  p_slowdown: {}  |  Seed: {}",
        sweep.sim_steps, sweep.v_max, sweep.p_slowdown, sweep.seed
    );
    println!();

    let mut writer = CsvWriter::new(&sweep.output_dir)
        .with_context(|| format!("creating output in {}", sweep.output_dir.display()))?;

    let t0 = Instant::now();
    for strategy in Strategy::ALL {
        let runs = sweep.runs(strategy);
        info!(%strategy, runs = runs.len(), "starting strategy");

        for run in &runs {
            let label = strategy.label(run.num_units);
            println!("  {label}: length={} density={}", run.road_length, run.density);

            let report = execute(strategy, run, &sweep)
                .with_context(|| format!("{label}, length {}, density {}", run.road_length, run.density))?;
            println!(
                "    -> {:.4} s  ({} cars, mean velocity {:.2})",
                report.elapsed_secs(),
                report.initial_cars,
                report.final_road.mean_velocity().unwrap_or(0.0),
            );

            writer.write_result(&RunResultRow::new(label, run, report.elapsed_secs()))?;
        }
    }
    writer.finish()?;

    println!();
    println!(
        "Sweep complete in {:.3} s, {} rows written to {}",
        t0.elapsed().as_secs_f64(),
        writer.rows(),
        writer.path().display()
    );
    Ok(())
}
