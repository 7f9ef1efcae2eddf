//! Non-blocking transport abstraction driven by the client's polling loop.
//!
//! Unlike the async transports this crate's design is modeled on, every
//! operation here returns immediately: `send`/`recv` report `NotReady`
//! instead of blocking or awaiting, so a caller can poll them from a plain
//! `loop {}` with no runtime underneath.

mod mem;

pub use mem::MemTransport;

use core::fmt;

/// Outcome of a non-blocking transport operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation completed.
    Ok,
    /// The operation would have to block; call again later.
    NotReady,
}

/// Transport-level failure. Distinct from protocol-level errors, which are
/// carried in the response payload itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The peer closed the transport.
    Closed,
    /// The frame didn't fit the transport's configured capacity.
    FrameTooLarge { len: usize, max: usize },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Closed => write!(f, "transport closed"),
            TransportError::FrameTooLarge { len, max } => {
                write!(f, "frame of {len} bytes exceeds transport capacity of {max} bytes")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// A byte-oriented, non-blocking, frame-preserving transport.
///
/// Implementations never sleep, yield, or spawn a task: `send`/`recv` return
/// `Ok(Status::NotReady)` the moment the operation can't complete, and the
/// caller is expected to retry.
pub trait Transport {
    /// Attempt to send one complete frame. `NotReady` means try again with
    /// the same `frame`; the frame is not consumed on `NotReady`.
    fn send(&self, frame: &[u8]) -> Result<Status, TransportError>;

    /// Attempt to receive one complete frame into `buf`, returning the
    /// number of bytes written. `NotReady` means no frame is available yet.
    fn recv(&self, buf: &mut [u8]) -> Result<(Status, usize), TransportError>;

    /// Mark the transport closed. Subsequent `send`/`recv` calls return
    /// `TransportError::Closed`.
    fn close(&self);

    fn is_closed(&self) -> bool;
}
