//! Wire messages.

use std::borrow::Cow;

use nasch_core::{PartialUpdate, Road, RunConfig, Segment, UnitId};
use serde::{Deserialize, Serialize};

/// Everything a peer needs before the first round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerAssignment {
    pub unit:    UnitId,
    pub segment: Segment,
    pub config:  RunConfig,
}

/// Coordinator → peer.
///
/// `Road` borrows on the sending side so broadcasting a snapshot to every
/// peer does not clone the road; received messages always own their data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CoordinatorMsg<'a> {
    Configure(PeerAssignment),
    Road { step: u64, road: Cow<'a, Road> },
    Terminate,
}

/// Peer → coordinator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PeerMsg {
    Update { step: u64, update: PartialUpdate },
}
