//! peer — a remote execution unit for `sweep` with `external_peers` set.
//!
//! ```text
//! peer [ADDR] [RUNS]
//! ```
//!
//! Connects to the coordinator at `ADDR` (default `127.0.0.1:65432`) and
//! serves `RUNS` consecutive runs (default 1).  Between runs the coordinator
//! rebinds its listener, so connections that are refused, reset or closed
//! before an assignment arrives are retried for up to 10 s.

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use nasch_net::coordinator::DEFAULT_BIND_ADDR;
use nasch_net::{Peer, Reconnect};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let runs: u64 = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid run count {n:?}"))?,
        None => 1,
    };
    if runs == 0 {
        bail!("run count must be positive");
    }

    for run in 1..=runs {
        let report = Peer::run_with_reconnect(addr.as_str(), Reconnect::default())
            .with_context(|| format!("run {run} of {runs} against {addr}"))?;
        info!(run, unit = %report.unit, rounds = report.rounds, "run finished");
        if !report.terminated {
            warn!(run, "coordinator closed without terminating");
        }
    }
    Ok(())
}
