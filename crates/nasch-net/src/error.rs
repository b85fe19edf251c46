use std::io;

use nasch_core::{CoreError, UnitId};
use nasch_sim::SimError;
use thiserror::Error;

/// Failures of a single framed connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(io::Error),

    #[error("timed out waiting for the remote side")]
    Timeout,

    #[error("connection closed")]
    Closed,

    #[error("stream ended after {got} of {expected} bytes")]
    Truncated {
        expected: usize,
        got:      usize,
    },

    #[error("frame of {len} bytes exceeds the {max}-byte limit")]
    FrameTooLarge {
        len: u64,
        max: u64,
    },

    #[error("payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout,
            _ => TransportError::Io(e),
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Errors surfaced by the coordinator and peer entry points.
#[derive(Debug, Error)]
pub enum NetError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot reach coordinator at {addr}: {source}")]
    Connect {
        addr:   String,
        #[source]
        source: io::Error,
    },

    #[error("lost {unit}: {source}")]
    PeerLost {
        unit:   UnitId,
        #[source]
        source: TransportError,
    },

    #[error("coordinator closed the connection before sending a configuration")]
    NotConfigured,

    #[error("coordinator has already run; bind a new one")]
    ListenerClosed,
}

impl NetError {
    /// Lift a lockstep failure back to the transport error that caused it.
    pub(crate) fn from_round(e: SimError) -> Self {
        match e {
            SimError::Unit { unit, source } => match source.downcast::<TransportError>() {
                Ok(t)       => NetError::PeerLost { unit, source: *t },
                Err(source) => NetError::Sim(SimError::Unit { unit, source }),
            },
            other => NetError::Sim(other),
        }
    }

    /// `true` if a peer failed before receiving its assignment in a way a
    /// fresh connection may cure: the coordinator was not listening, or it
    /// closed or reset the connection before configuring it.
    pub fn is_retryable_before_configure(&self) -> bool {
        fn dropped(e: &io::Error) -> bool {
            matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
            )
        }
        match self {
            NetError::Connect { .. } | NetError::NotConfigured => true,
            NetError::Transport(TransportError::Io(e)) | NetError::Io(e) => dropped(e),
            NetError::Transport(TransportError::Truncated { .. } | TransportError::Closed) => true,
            _ => false,
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;
