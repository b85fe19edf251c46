//! The networked coordinator.
//!
//! # States
//!
//! ```text
//! AwaitingPeers ──► Configuring ──► Stepping ──► Draining ──► Closed
//!                        │              │            ▲
//!                        └──────────────┴────────────┘  (failure)
//! ```
//!
//! - **AwaitingPeers** accepts exactly `num_units` connections and assigns
//!   segments in arrival order, then closes the listener.  Connections
//!   attempted after that are refused rather than parked in a backlog.
//! - **Configuring** sends each peer its [`PeerAssignment`].
//! - **Stepping** runs `sim_steps` lockstep rounds; each peer is a
//!   [`RemotePeer`] executor on its own thread.
//! - **Draining** sends `Terminate` to every peer (best effort after a
//!   failure).
//! - **Closed** shuts every connection down.  A coordinator runs once; its
//!   final state stays readable through [`Coordinator::state`].
//!
//! Every peer read is bounded by [`CoordinatorConfig::peer_timeout`].  A
//! timeout, end-of-stream, or transport error on any peer abandons the whole
//! run and surfaces as [`NetError::PeerLost`].

use std::borrow::Cow;
use std::fmt;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use nasch_core::{PartialUpdate, Road, RunConfig, Segment, UnitId, partition};
use nasch_sim::{
    LockstepOptions, NoopObserver, RunReport, SegmentExecutor, SimError, SimObserver, SimResult,
    run_lockstep,
};
use tracing::{debug, info, warn};

use crate::frame::DEFAULT_MAX_FRAME_LEN;
use crate::{
    CoordinatorMsg, Framed, NetError, NetResult, PeerAssignment, PeerMsg, TransportError,
    TransportResult,
};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:65432";

/// Default bound on a single peer read.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(30);

// ── CoordinatorConfig ─────────────────────────────────────────────────────────

/// Networking parameters of the coordinator.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Address the listener binds to.  Port 0 picks a free port; read it
    /// back with [`Coordinator::local_addr`].
    pub bind_addr:     SocketAddr,
    /// Upper bound on every read from a peer.  `None` waits indefinitely.
    pub peer_timeout:  Option<Duration>,
    /// Largest accepted frame payload.
    pub max_frame_len: u64,
}

impl CoordinatorConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            peer_timeout:  Some(DEFAULT_PEER_TIMEOUT),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn with_peer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.peer_timeout = timeout;
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 65432)))
    }
}

// ── CoordinatorState ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    AwaitingPeers,
    Configuring,
    Stepping,
    Draining,
    Closed,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ── RemotePeer ────────────────────────────────────────────────────────────────

/// The coordinator's handle on one connected peer.
pub struct RemotePeer {
    segment: Segment,
    addr:    SocketAddr,
    framed:  Framed<TcpStream>,
}

impl RemotePeer {
    fn new(stream: TcpStream, addr: SocketAddr, segment: Segment, options: &CoordinatorConfig) -> TransportResult<Self> {
        stream.set_read_timeout(options.peer_timeout)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            segment,
            addr,
            framed: Framed::new(stream).with_max_frame_len(options.max_frame_len),
        })
    }

    pub fn unit(&self) -> UnitId {
        self.segment.owner
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn configure(&mut self, config: &RunConfig) -> TransportResult<()> {
        let assignment = PeerAssignment {
            unit:    self.unit(),
            segment: self.segment,
            config:  config.clone(),
        };
        self.framed.send(&CoordinatorMsg::Configure(assignment))
    }

    /// Send the road for `step` and wait for the matching update.
    fn exchange(&mut self, step: u64, road: &Road) -> TransportResult<PartialUpdate> {
        self.framed.send(&CoordinatorMsg::Road { step, road: Cow::Borrowed(road) })?;
        let PeerMsg::Update { step: got, update } = self.framed.recv_required()?;
        if got != step {
            return Err(TransportError::Protocol(format!(
                "expected update for step {step}, got step {got}"
            )));
        }
        if update.owner != self.unit() {
            return Err(TransportError::Protocol(format!(
                "{} answered with an update for {}",
                self.unit(),
                update.owner
            )));
        }
        Ok(update)
    }

    fn terminate(&mut self) -> TransportResult<()> {
        self.framed.send(&CoordinatorMsg::Terminate)
    }

    fn close(&self) {
        if let Err(e) = self.framed.get_ref().shutdown(Shutdown::Both) {
            debug!(unit = %self.unit(), error = %e, "shutdown");
        }
    }
}

impl SegmentExecutor for RemotePeer {
    fn segment(&self) -> Segment {
        self.segment
    }

    fn compute(&mut self, step: u64, road: &Road) -> SimResult<PartialUpdate> {
        self.exchange(step, road).map_err(|e| SimError::Unit {
            unit:   self.unit(),
            source: Box::new(e),
        })
    }
}

/// Lets the coordinator lend its peers to a lockstep run and keep them for
/// draining afterwards.
struct Lent<'a>(&'a mut RemotePeer);

impl SegmentExecutor for Lent<'_> {
    fn segment(&self) -> Segment {
        self.0.segment()
    }

    fn compute(&mut self, step: u64, road: &Road) -> SimResult<PartialUpdate> {
        self.0.compute(step, road)
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

/// Owns the canonical road and drives a networked run.
pub struct Coordinator {
    config:     RunConfig,
    options:    CoordinatorConfig,
    /// `None` once the peers have been accepted.
    listener:   Option<TcpListener>,
    local_addr: SocketAddr,
    state:      CoordinatorState,
}

impl Coordinator {
    /// Validate `config` and bind the listener.
    pub fn bind(config: RunConfig, options: CoordinatorConfig) -> NetResult<Self> {
        config.validate()?;
        let listener = TcpListener::bind(options.bind_addr)?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, peers = config.num_units, "coordinator listening");
        Ok(Self {
            config,
            options,
            listener: Some(listener),
            local_addr,
            state: CoordinatorState::AwaitingPeers,
        })
    }

    /// The address the listener was bound to, also after it has closed.
    pub fn local_addr(&self) -> NetResult<SocketAddr> {
        Ok(self.local_addr)
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the whole protocol from `road` with no observer.
    pub fn run(&mut self, road: Road) -> NetResult<RunReport> {
        self.run_with_observer(road, &mut NoopObserver)
    }

    /// Run the whole protocol from `road`.  The observer is called on the
    /// merging thread after each committed step.
    ///
    /// Ends in [`CoordinatorState::Closed`] whether or not the run succeeds;
    /// a second call fails with [`NetError::ListenerClosed`].
    pub fn run_with_observer<O: SimObserver + Send>(
        &mut self,
        road:     Road,
        observer: &mut O,
    ) -> NetResult<RunReport> {
        let listener = self.listener.take().ok_or(NetError::ListenerClosed)?;
        if let Err(e) = road.check(self.config.road_length, self.config.v_max) {
            self.transition(CoordinatorState::Closed);
            return Err(e.into());
        }
        let initial_cars = road.occupied_count();

        let accepted = self.accept_peers(&listener);
        drop(listener);
        let mut peers = match accepted {
            Ok(peers) => peers,
            Err(e) => {
                self.transition(CoordinatorState::Closed);
                return Err(e);
            }
        };

        self.transition(CoordinatorState::Configuring);
        if let Err(e) = self.configure_peers(&mut peers) {
            self.shut_down(&mut peers, false);
            return Err(e);
        }

        self.transition(CoordinatorState::Stepping);
        let start = Instant::now();
        let outcome = run_lockstep(
            road,
            self.config.v_max,
            peers.iter_mut().map(Lent).collect(),
            self.config.sim_steps,
            &LockstepOptions::default(),
            observer,
        );

        let completed = outcome.is_ok();
        self.shut_down(&mut peers, completed);
        let elapsed = start.elapsed();

        let outcome = outcome.map_err(NetError::from_round)?;
        info!(elapsed_secs = elapsed.as_secs_f64(), steps = outcome.steps, "distributed run finished");
        Ok(RunReport {
            elapsed,
            steps: outcome.steps,
            initial_cars,
            final_road: outcome.road,
            collisions: outcome.collisions,
        })
    }

    fn transition(&mut self, next: CoordinatorState) {
        debug!(from = %self.state, to = %next, "coordinator state");
        self.state = next;
    }

    /// Accept exactly `num_units` connections, assigning segments in arrival
    /// order.
    fn accept_peers(&self, listener: &TcpListener) -> NetResult<Vec<RemotePeer>> {
        let segments = partition(self.config.road_length, self.config.num_units)?;
        info!(peers = segments.len(), "waiting for peers");

        let mut peers = Vec::with_capacity(segments.len());
        for segment in segments {
            let (stream, addr) = listener.accept()?;
            info!(
                %addr,
                unit = %segment.owner,
                start = segment.start,
                end = segment.end,
                "peer connected"
            );
            peers.push(RemotePeer::new(stream, addr, segment, &self.options)?);
        }
        Ok(peers)
    }

    fn configure_peers(&self, peers: &mut [RemotePeer]) -> NetResult<()> {
        for peer in peers.iter_mut() {
            peer.configure(&self.config)
                .map_err(|source| NetError::PeerLost { unit: peer.unit(), source })?;
        }
        Ok(())
    }

    /// Draining then Closed.  After a failure, `Terminate` is best effort.
    fn shut_down(&mut self, peers: &mut [RemotePeer], completed: bool) {
        self.transition(CoordinatorState::Draining);
        for peer in peers.iter_mut() {
            if let Err(e) = peer.terminate() {
                if completed {
                    warn!(unit = %peer.unit(), addr = %peer.addr(), error = %e, "terminate failed");
                } else {
                    debug!(unit = %peer.unit(), error = %e, "terminate after failure");
                }
            }
        }

        self.transition(CoordinatorState::Closed);
        for peer in peers.iter() {
            peer.close();
        }
    }
}
