//! Coordinator plus in-process peers over loopback, for the harness and
//! tests.

use std::net::SocketAddr;
use std::thread;

use nasch_core::{Road, RunConfig, SimRng};
use nasch_sim::RunReport;
use tracing::warn;

use crate::{Coordinator, CoordinatorConfig, NetResult, Peer};

/// Run `config` with `config.num_units` peer threads connected to a
/// coordinator on an ephemeral loopback port.
pub fn run_distributed_local(config: &RunConfig) -> NetResult<RunReport> {
    config.validate()?;
    let road = Road::random(config, &mut SimRng::new(config.seed));
    run_distributed_local_with_road(config, road, CoordinatorConfig::new(SocketAddr::from(([127, 0, 0, 1], 0))))
}

/// As [`run_distributed_local`], starting from `road` with explicit
/// coordinator options.
pub fn run_distributed_local_with_road(
    config:  &RunConfig,
    road:    Road,
    options: CoordinatorConfig,
) -> NetResult<RunReport> {
    let mut coordinator = Coordinator::bind(config.clone(), options)?;
    let addr = coordinator.local_addr()?;

    thread::scope(|s| {
        for _ in 0..config.num_units {
            s.spawn(move || {
                if let Err(e) = Peer::connect(addr).and_then(Peer::run) {
                    warn!(error = %e, "local peer failed");
                }
            });
        }
        coordinator.run(road)
    })
}
