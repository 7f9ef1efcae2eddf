use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Status, Transport, TransportError};

const CHANNEL_CAPACITY: usize = 64;

type Queue = Arc<Mutex<VecDeque<Vec<u8>>>>;

/// Reference in-process transport: two [`MemTransport`] handles share a pair
/// of bounded frame queues, one per direction.
#[derive(Clone, Debug)]
pub struct MemTransport {
    outbox: Queue,
    inbox: Queue,
    closed: Arc<AtomicBool>,
}

impl MemTransport {
    /// Build a connected pair: frames sent on one side arrive on the other.
    pub fn pair() -> (Self, Self) {
        let a_to_b: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let b_to_a: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let a = Self {
            outbox: a_to_b.clone(),
            inbox: b_to_a.clone(),
            closed: closed.clone(),
        };
        let b = Self {
            outbox: b_to_a,
            inbox: a_to_b,
            closed,
        };
        (a, b)
    }

    fn push(&self, queue: &Queue, frame: &[u8]) -> Result<Status, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut q = queue.lock();
        if q.len() >= CHANNEL_CAPACITY {
            return Ok(Status::NotReady);
        }
        q.push_back(frame.to_vec());
        Ok(Status::Ok)
    }

    fn pop(&self, queue: &Queue, buf: &mut [u8]) -> Result<(Status, usize), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut q = queue.lock();
        match q.front() {
            None => Ok((Status::NotReady, 0)),
            Some(frame) => {
                if frame.len() > buf.len() {
                    return Err(TransportError::FrameTooLarge {
                        len: frame.len(),
                        max: buf.len(),
                    });
                }
                let frame = q.pop_front().unwrap();
                buf[..frame.len()].copy_from_slice(&frame);
                Ok((Status::Ok, frame.len()))
            }
        }
    }
}

impl Transport for MemTransport {
    fn send(&self, frame: &[u8]) -> Result<Status, TransportError> {
        self.push(&self.outbox, frame)
    }

    fn recv(&self, buf: &mut [u8]) -> Result<(Status, usize), TransportError> {
        self.pop(&self.inbox, buf)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
