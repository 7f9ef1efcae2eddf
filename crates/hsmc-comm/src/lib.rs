//! Request/response framing: builds header-prefixed frames and parses them
//! back, owning the per-client request id sequence.
//!
//! This layer does not retry or enforce the single-outstanding-request rule;
//! that belongs to the driver above it. It only knows how to turn
//! `(kind, body)` into bytes and back.

use hsmc_transport::{Status, Transport, TransportError};
use hsmc_wire::{Header, HEADER_LEN, MAGIC_NATIVE};

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommError {
    Transport(TransportError),
    /// Frame shorter than a header, or header claims more body than was
    /// actually received.
    Truncated,
    /// Header `magic` didn't match a native peer.
    BadMagic(u16),
    /// Header `client_id` didn't match this client's id; the frame belongs
    /// to a different session sharing the transport.
    ClientIdMismatch { expected: u32, got: u32 },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommError::Transport(e) => write!(f, "transport error: {e}"),
            CommError::Truncated => write!(f, "frame truncated"),
            CommError::BadMagic(m) => write!(f, "unexpected magic: 0x{m:04x}"),
            CommError::ClientIdMismatch { expected, got } => {
                write!(f, "client id mismatch: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for CommError {}

impl From<TransportError> for CommError {
    fn from(e: TransportError) -> Self {
        CommError::Transport(e)
    }
}

/// Outcome of a non-blocking receive attempt.
#[derive(Debug)]
pub enum RecvOutcome {
    NotReady,
    Frame { header: Header, body_len: usize },
}

/// Frames requests, parses responses, and hands out request ids for one
/// client session riding a single [`Transport`].
#[derive(Debug)]
pub struct CommClient<T> {
    transport: T,
    client_id: u32,
    next_req_id: u16,
}

impl<T: Transport> CommClient<T> {
    pub fn new(transport: T, client_id: u32) -> Self {
        CommClient {
            transport,
            client_id,
            next_req_id: 1,
        }
    }

    pub fn client_id(&self) -> u32 {
        self.client_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Allocate the next request id. Wraps past `u16::MAX` back to 1; 0 is
    /// reserved and never handed out.
    pub fn alloc_req_id(&mut self) -> u16 {
        let id = self.next_req_id;
        self.next_req_id = if self.next_req_id == u16::MAX {
            1
        } else {
            self.next_req_id + 1
        };
        id
    }

    /// Build a header-prefixed frame ready to hand to [`Self::try_send`].
    pub fn encode_request(&self, kind: u16, req_id: u16, body: &[u8]) -> Vec<u8> {
        let header = Header::new(kind, req_id, self.client_id, body.len() as u16);
        let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(body);
        frame
    }

    /// Attempt one non-blocking send of a pre-built frame. On `NotReady` the
    /// caller retries with the same frame; nothing is consumed.
    pub fn try_send(&self, frame: &[u8]) -> Result<Status, CommError> {
        Ok(self.transport.send(frame)?)
    }

    /// Attempt one non-blocking receive into `buf`. Validates `magic` and
    /// `client_id` but does not check `kind`/`req_id` against any
    /// outstanding request; that's the driver's job since it knows which
    /// request is in flight.
    pub fn try_recv(&self, buf: &mut [u8]) -> Result<RecvOutcome, CommError> {
        let (status, n) = self.transport.recv(buf)?;
        if status == Status::NotReady {
            return Ok(RecvOutcome::NotReady);
        }
        if n < HEADER_LEN {
            return Err(CommError::Truncated);
        }
        let header = Header::decode(&buf[..n]).ok_or(CommError::Truncated)?;
        if header.magic != MAGIC_NATIVE {
            return Err(CommError::BadMagic(header.magic));
        }
        if header.client_id != self.client_id {
            return Err(CommError::ClientIdMismatch {
                expected: self.client_id,
                got: header.client_id,
            });
        }
        let body_len = header.size as usize;
        if n < HEADER_LEN + body_len {
            return Err(CommError::Truncated);
        }
        Ok(RecvOutcome::Frame { header, body_len })
    }

    pub fn close(&self) {
        self.transport.close();
    }
}
