//! `nasch-net` — the networked master/worker variant.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                       |
//! |-----------------|----------------------------------------------------------------|
//! | [`frame`]       | `[u64 BE length][payload]` framing, `Framed<S>` send/recv      |
//! | [`message`]     | `CoordinatorMsg`, `PeerMsg`, `PeerAssignment`                  |
//! | [`coordinator`] | `Coordinator` state machine, `RemotePeer` executor             |
//! | [`peer`]        | `Peer`, the remote execution unit loop, `Reconnect`            |
//! | [`local`]       | `run_distributed_local`: coordinator + in-process peers       |
//! | [`error`]       | `TransportError`, `NetError`                                   |
//!
//! # Protocol
//!
//! ```text
//! coordinator                          peer
//!   accept ◄──────────────────────────  connect
//!   Configure(assignment) ───────────►  Configured
//!   ┌ Road { step, road } ───────────►  compute segment
//!   └ ◄──────────────────────────────  Update { step, update }     × sim_steps
//!   Terminate ───────────────────────►  exit loop, close
//! ```
//!
//! Every frame is an 8-byte big-endian length followed by a JSON payload.
//! The coordinator drives the rounds through `nasch_sim::run_lockstep`, one
//! thread per peer connection, so the two-barrier discipline is the same as
//! in the shared-memory runner.

pub mod coordinator;
pub mod error;
pub mod frame;
pub mod local;
pub mod message;
pub mod peer;


pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorState, RemotePeer};
pub use error::{NetError, NetResult, TransportError, TransportResult};
pub use frame::{Framed, read_frame, write_frame};
pub use local::{run_distributed_local, run_distributed_local_with_road};
pub use message::{CoordinatorMsg, PeerAssignment, PeerMsg};
pub use peer::{Peer, PeerReport, Reconnect};
