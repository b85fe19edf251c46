//! Length-prefixed framing over any blocking byte stream.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────┐
//! │ length: u64 (BE, 8B) │ payload: `length` bytes  │
//! └──────────────────────┴──────────────────────────┘
//! ```
//!
//! A clean end-of-stream before the first header byte is an orderly close
//! (`Ok(None)`); a stream that ends anywhere else is
//! [`TransportError::Truncated`].

use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{TransportError, TransportResult};

/// Size of the length header.
pub const HEADER_LEN: usize = 8;

/// Default upper bound on a single payload (256 MiB).
pub const DEFAULT_MAX_FRAME_LEN: u64 = 256 * 1024 * 1024;

/// Payload bytes are pulled from the stream at most this many at a time.
const READ_CHUNK: usize = 4096;

/// Write one frame carrying `payload`.
///
/// Header and payload go out in a single `write_all` so small frames are not
/// split across segments.
pub fn write_frame<W: Write>(w: &mut W, payload: &[u8]) -> TransportResult<()> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.write_u64::<BigEndian>(payload.len() as u64)?;
    frame.extend_from_slice(payload);
    w.write_all(&frame)?;
    w.flush()?;
    Ok(())
}

/// Read one frame.  Returns `Ok(None)` on an orderly close.
pub fn read_frame<R: Read>(r: &mut R, max_len: u64) -> TransportResult<Option<Vec<u8>>> {
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match r.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(TransportError::Truncated { expected: HEADER_LEN, got: filled }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = BigEndian::read_u64(&header);
    if len > max_len {
        return Err(TransportError::FrameTooLarge { len, max: max_len });
    }
    let len = usize::try_from(len)
        .map_err(|_| TransportError::FrameTooLarge { len, max: max_len })?;

    // The header is untrusted; grow the buffer as bytes actually arrive.
    let mut payload = Vec::with_capacity(len.min(1 << 20));
    let mut chunk = [0u8; READ_CHUNK];
    while payload.len() < len {
        let want = (len - payload.len()).min(READ_CHUNK);
        match r.read(&mut chunk[..want]) {
            Ok(0) => return Err(TransportError::Truncated { expected: len, got: payload.len() }),
            Ok(n) => payload.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(payload))
}

// ── Framed ────────────────────────────────────────────────────────────────────

/// A byte stream that exchanges serialized messages, one per frame.
pub struct Framed<S> {
    inner:         S,
    max_frame_len: u64,
}

impl<S> Framed<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, max_frame_len: DEFAULT_MAX_FRAME_LEN }
    }

    pub fn with_max_frame_len(mut self, max_frame_len: u64) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Write> Framed<S> {
    /// Serialize `msg` and send it as one frame.
    pub fn send<T: Serialize + ?Sized>(&mut self, msg: &T) -> TransportResult<()> {
        let payload = serde_json::to_vec(msg)?;
        write_frame(&mut self.inner, &payload)
    }
}

impl<S: Read> Framed<S> {
    /// Receive and deserialize one frame; `Ok(None)` on an orderly close.
    pub fn recv<T: DeserializeOwned>(&mut self) -> TransportResult<Option<T>> {
        match read_frame(&mut self.inner, self.max_frame_len)? {
            None => Ok(None),
            Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
        }
    }

    /// Receive a message that must be present; end-of-stream is
    /// [`TransportError::Closed`].
    pub fn recv_required<T: DeserializeOwned>(&mut self) -> TransportResult<T> {
        self.recv()?.ok_or(TransportError::Closed)
    }
}
