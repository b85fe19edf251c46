//! The remote execution unit.
//!
//! ```text
//! Connected ──► Configured ──► (Receiving ──► Computing ──► Sending)* ──► Terminated
//! ```
//!
//! The loop ends on `Terminate`, on an orderly close by the coordinator, or
//! on any transport error; the connection is closed in every case.
//!
//! A peer serving consecutive runs uses [`Peer::run_with_reconnect`]: until
//! an assignment arrives, a refused, reset or closed connection is retried
//! within a [`Reconnect`] window.

use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use nasch_core::{CoreError, UnitId};
use nasch_sim::{LocalExecutor, SegmentExecutor};
use tracing::{debug, info, warn};

use crate::{CoordinatorMsg, Framed, NetError, NetResult, PeerAssignment, PeerMsg, TransportError};

/// Summary of a finished peer loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerReport {
    pub unit:       UnitId,
    /// Number of updates sent.
    pub rounds:     u64,
    /// `true` if the loop ended on an explicit `Terminate`, `false` if the
    /// coordinator simply went away.
    pub terminated: bool,
}

/// How long and how often to retry reaching a coordinator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reconnect {
    /// Give up once this much time has passed since the first attempt.
    pub window:   Duration,
    pub interval: Duration,
}

impl Default for Reconnect {
    fn default() -> Self {
        Self {
            window:   Duration::from_secs(10),
            interval: Duration::from_millis(100),
        }
    }
}

/// A connected peer, not yet configured.
pub struct Peer {
    addr:   SocketAddr,
    framed: Framed<TcpStream>,
}

impl Peer {
    /// Connect to the coordinator.  There is no retry: a refused or
    /// unreachable coordinator is reported immediately.
    pub fn connect<A: ToSocketAddrs + std::fmt::Display>(addr: A) -> NetResult<Self> {
        let stream = TcpStream::connect(&addr)
            .map_err(|source| NetError::Connect { addr: addr.to_string(), source })?;
        Self::from_stream(stream)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> NetResult<Self> {
        stream.set_nodelay(true)?;
        let addr = stream.peer_addr()?;
        info!(%addr, "connected to coordinator");
        Ok(Self { addr, framed: Framed::new(stream) })
    }

    /// Bound every read from the coordinator.  By default reads block
    /// indefinitely, since the coordinator may legitimately wait on slower
    /// peers between rounds.
    pub fn with_read_timeout(self, timeout: Option<Duration>) -> NetResult<Self> {
        self.framed.get_ref().set_read_timeout(timeout)?;
        Ok(self)
    }

    pub fn coordinator_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the peer loop to completion.
    pub fn run(mut self) -> NetResult<PeerReport> {
        let result = self.await_assignment().and_then(|a| self.serve(a));
        self.close();
        result
    }

    /// Connect to `addr` and serve one run, retrying within `reconnect`
    /// while no assignment has been received.  Failures after configuration
    /// are returned as is.
    pub fn run_with_reconnect<A>(addr: A, reconnect: Reconnect) -> NetResult<PeerReport>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let deadline = Instant::now() + reconnect.window;
        loop {
            let attempt = Peer::connect(&addr).and_then(|mut peer| {
                let assignment = peer.await_assignment();
                if assignment.is_err() {
                    peer.close();
                }
                assignment.map(|a| (peer, a))
            });
            match attempt {
                Ok((mut peer, assignment)) => {
                    let result = peer.serve(assignment);
                    peer.close();
                    return result;
                }
                Err(e) if e.is_retryable_before_configure() && Instant::now() < deadline => {
                    debug!(%addr, error = %e, "coordinator not ready; retrying");
                    thread::sleep(reconnect.interval);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn close(&self) {
        if let Err(e) = self.framed.get_ref().shutdown(Shutdown::Both) {
            debug!(error = %e, "shutdown");
        }
    }

    fn await_assignment(&mut self) -> NetResult<PeerAssignment> {
        match self.framed.recv::<CoordinatorMsg<'static>>()? {
            Some(CoordinatorMsg::Configure(assignment)) => Ok(assignment),
            Some(other) => Err(TransportError::Protocol(format!(
                "expected Configure, got {}",
                message_kind(&other)
            ))
            .into()),
            None => Err(NetError::NotConfigured),
        }
    }

    fn serve(&mut self, assignment: PeerAssignment) -> NetResult<PeerReport> {
        let mut executor = configured_executor(&assignment)?;
        let unit = assignment.unit;
        let config = &assignment.config;
        info!(%unit, start = assignment.segment.start, end = assignment.segment.end, "configured");

        let mut rounds = 0;
        let terminated = loop {
            match self.framed.recv::<CoordinatorMsg<'static>>()? {
                None => {
                    warn!(%unit, "coordinator disconnected");
                    break false;
                }
                Some(CoordinatorMsg::Terminate) => {
                    info!(%unit, rounds, "terminate received");
                    break true;
                }
                Some(CoordinatorMsg::Road { step, road }) => {
                    road.check(config.road_length, config.v_max)?;
                    let update = executor.compute(step, &road)?;
                    self.framed.send(&PeerMsg::Update { step, update })?;
                    rounds += 1;
                    debug!(%unit, step, "update sent");
                }
                Some(other @ CoordinatorMsg::Configure(_)) => {
                    return Err(TransportError::Protocol(format!(
                        "unexpected {} after configuration",
                        message_kind(&other)
                    ))
                    .into());
                }
            }
        };

        Ok(PeerReport { unit, rounds, terminated })
    }
}

/// Validate an assignment and build the executor for it.
fn configured_executor(assignment: &PeerAssignment) -> NetResult<LocalExecutor> {
    let config = &assignment.config;
    config.validate()?;
    let segment = assignment.segment;
    if segment.owner != assignment.unit || segment.start > segment.end || segment.end > config.road_length {
        return Err(CoreError::Partition {
            road_length: config.road_length,
            num_units:   config.num_units,
        }
        .into());
    }
    Ok(LocalExecutor::new(segment, config.rule_params(), config.seed))
}

fn message_kind(msg: &CoordinatorMsg<'_>) -> &'static str {
    match msg {
        CoordinatorMsg::Configure(_) => "Configure",
        CoordinatorMsg::Road { .. }  => "Road",
        CoordinatorMsg::Terminate    => "Terminate",
    }
}
