//! The client protocol driver: tracks the single outstanding exchange and
//! validates replies against it (spec.md §3, §4.3).

use hsmc_comm::{CommClient, CommError, RecvOutcome};
use hsmc_transport::{Status, Transport};
use hsmc_wire::{pack, unpack, Group};

use crate::config::{ClientConfig, CryptoBridge};
use crate::error::{HsmError, RC_OK};
use crate::stats::HsmStats;

const RECV_BUF_LEN: usize = hsmc_wire::COMM_MTU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Awaiting { kind: u16, req_id: u16 },
    Terminated,
}

/// Outcome of one non-blocking [`ClientContext::send_request`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Sent { req_id: u16 },
    NotReady,
}

/// Outcome of one non-blocking [`ClientContext::recv_response`] attempt.
#[derive(Debug)]
pub enum RecvStatus {
    /// The matching reply arrived. `payload` is `stub ++ body ++ tail`.
    Received { group: Group, action: u8, payload: Vec<u8> },
    NotReady,
}

/// Owns one [`CommClient`] and the `(last_req_kind, last_req_id)` pair that
/// names the single outstanding exchange, per spec.md's state machine:
///
/// ```text
/// IDLE ──send_request──▶ AWAITING(kind, id)
/// AWAITING ──recv matches──▶ IDLE
/// AWAITING ──recv mismatches──▶ IDLE (ABORTED surfaced)
/// any ──cleanup──▶ TERMINATED
/// ```
pub struct ClientContext<T> {
    comm: CommClient<T>,
    state: State,
    stats: HsmStats,
    crypto: Option<Box<dyn CryptoBridge>>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ClientContext<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("comm", &self.comm)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("crypto", &self.crypto.is_some())
            .finish()
    }
}

impl<T: Transport> ClientContext<T> {
    /// Brings up the embedded `CommClient` and, if `config.crypto` is set,
    /// registers the crypto provider bridge (spec.md §4.3). On registration
    /// failure, tears the partially-built context down and propagates the
    /// error: "on any sub-step failure, call cleanup and propagate the
    /// first non-zero error".
    pub fn init(config: ClientConfig<T>) -> Result<Self, HsmError> {
        let ClientConfig { comm, crypto } = config;
        tracing::debug!(client_id = comm.client_id, "initializing client context");
        let mut ctx = ClientContext {
            comm: CommClient::new(comm.transport, comm.client_id),
            state: State::Idle,
            stats: HsmStats::default(),
            crypto: None,
        };
        if let Some(bridge) = crypto {
            if let Err(err) = bridge.register() {
                ctx.cleanup();
                return Err(err);
            }
            ctx.crypto = Some(bridge);
        }
        Ok(ctx)
    }

    pub fn client_id(&self) -> u32 {
        self.comm.client_id()
    }

    pub fn stats(&self) -> HsmStats {
        self.stats
    }

    pub fn is_terminated(&self) -> bool {
        self.state == State::Terminated
    }

    /// Best-effort, idempotent teardown. Releases the crypto bridge
    /// registration (if any), closes the transport, and zeroes any
    /// in-flight exchange bookkeeping.
    pub fn cleanup(&mut self) {
        if self.state == State::Terminated {
            return;
        }
        tracing::debug!(client_id = self.client_id(), "cleaning up client context");
        if let Some(bridge) = self.crypto.take() {
            bridge.unregister();
        }
        self.comm.close();
        self.state = State::Terminated;
    }

    /// One non-blocking attempt to emit a request. Computes `kind` from
    /// `(group, action)`, builds the frame, and hands it to the transport.
    /// On success, records `(kind, req_id)` as the outstanding exchange.
    ///
    /// Each call that returns `NotReady` allocates and discards a request
    /// id; nothing was transmitted, so no id collision results (spec.md §3
    /// only requires uniqueness among requests that were actually sent).
    pub fn send_request(
        &mut self,
        group: Group,
        action: u8,
        body: &[u8],
    ) -> Result<SendStatus, HsmError> {
        if self.state == State::Terminated {
            return Err(HsmError::BadArgs);
        }
        let req_id = self.comm.alloc_req_id();
        let kind = pack(group, action);
        let frame = self.comm.encode_request(kind, req_id, body);
        match self.comm.try_send(&frame)? {
            Status::NotReady => Ok(SendStatus::NotReady),
            Status::Ok => {
                self.state = State::Awaiting { kind, req_id };
                self.stats.record_sent();
                Ok(SendStatus::Sent { req_id })
            }
        }
    }

    /// One non-blocking attempt to receive the outstanding reply. Returns
    /// `BadArgs` if no request is outstanding.
    pub fn recv_response(&mut self) -> Result<RecvStatus, HsmError> {
        let (expected_kind, expected_req_id) = match self.state {
            State::Awaiting { kind, req_id } => (kind, req_id),
            State::Idle => return Err(HsmError::BadArgs),
            State::Terminated => return Err(HsmError::BadArgs),
        };

        let mut buf = [0u8; RECV_BUF_LEN];
        let outcome = match self.comm.try_recv(&mut buf) {
            Ok(outcome) => outcome,
            Err(e) => return Err(HsmError::from(e)),
        };

        let (header, body_len) = match outcome {
            RecvOutcome::NotReady => return Ok(RecvStatus::NotReady),
            RecvOutcome::Frame { header, body_len } => (header, body_len),
        };

        if header.kind != expected_kind || header.req_id != expected_req_id {
            self.state = State::Idle;
            self.stats.record_aborted();
            tracing::debug!(
                expected_kind,
                expected_req_id,
                got_kind = header.kind,
                got_req_id = header.req_id,
                "reply mismatch, aborting exchange"
            );
            return Err(HsmError::Aborted);
        }

        let (group, action) = unpack(header.kind).map_err(|_| HsmError::Aborted)?;
        let payload =
            buf[hsmc_wire::HEADER_LEN..hsmc_wire::HEADER_LEN + body_len].to_vec();

        self.state = State::Idle;
        self.stats.record_ok();
        Ok(RecvStatus::Received {
            group,
            action,
            payload,
        })
    }

    /// Drains and discards a pending reply, if any, returning the context
    /// to `IDLE` without validating it against anything. Used by callers
    /// that abandon a retry loop before a matching reply arrives.
    pub fn flush_pending(&mut self) -> Result<(), HsmError> {
        if !matches!(self.state, State::Awaiting { .. }) {
            return Ok(());
        }
        let mut buf = [0u8; RECV_BUF_LEN];
        match self.comm.try_recv(&mut buf) {
            Ok(_) | Err(CommError::Truncated) | Err(CommError::BadMagic(_)) => {}
            Err(e) => return Err(HsmError::from(e)),
        }
        self.state = State::Idle;
        Ok(())
    }

    /// The canonical busy-retry wait primitive from spec.md §4.3: send
    /// once, then loop `NOTREADY` away, for both halves of the exchange.
    pub(crate) fn send_and_recv(
        &mut self,
        group: Group,
        action: u8,
        body: &[u8],
    ) -> Result<Vec<u8>, HsmError> {
        loop {
            match self.send_request(group, action, body)? {
                SendStatus::Sent { .. } => break,
                SendStatus::NotReady => continue,
            }
        }
        loop {
            match self.recv_response()? {
                RecvStatus::Received { payload, .. } => return Ok(payload),
                RecvStatus::NotReady => continue,
            }
        }
    }
}

/// Splits a response payload into its stub return code and remaining body,
/// surfacing a nonzero `rc` as an [`HsmError`] (spec.md §4.4 rule 4).
pub(crate) fn split_stub(payload: &[u8]) -> Result<&[u8], HsmError> {
    let stub = hsmc_wire::Stub::decode(payload).ok_or(HsmError::Aborted)?;
    let rest = &payload[hsmc_wire::STUB_LEN..];
    if stub.rc == RC_OK {
        Ok(rest)
    } else {
        Err(HsmError::from_rc(stub.rc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsmc_transport::MemTransport;

    #[test]
    fn cleanup_is_idempotent() {
        let (t, _peer) = MemTransport::pair();
        let mut ctx = ClientContext::init(ClientConfig::comm_only(t, 1)).unwrap();
        ctx.cleanup();
        assert!(ctx.is_terminated());
        ctx.cleanup();
        assert!(ctx.is_terminated());
    }

    #[test]
    fn send_request_records_outstanding_exchange() {
        let (t, _peer) = MemTransport::pair();
        let mut ctx = ClientContext::init(ClientConfig::comm_only(t, 1)).unwrap();
        let status = ctx.send_request(Group::Comm, 3, b"ping").unwrap();
        assert!(matches!(status, SendStatus::Sent { .. }));
        assert_eq!(ctx.stats().requests_sent, 1);
    }

    #[test]
    fn recv_without_outstanding_request_is_bad_args() {
        let (t, _peer) = MemTransport::pair();
        let mut ctx = ClientContext::init(ClientConfig::comm_only(t, 1)).unwrap();
        assert_eq!(ctx.recv_response().unwrap_err(), HsmError::BadArgs);
    }

    #[test]
    fn mismatched_reply_is_aborted() {
        let (a, b) = MemTransport::pair();
        let mut ctx = ClientContext::init(ClientConfig::comm_only(a, 1)).unwrap();
        ctx.send_request(Group::Key, 1, &[]).unwrap();

        // Peer replies with the wrong kind/req_id.
        let bogus_comm = CommClient::new(b, 1);
        let frame = bogus_comm.encode_request(pack(Group::Key, 2), 999, &[]);
        bogus_comm.try_send(&frame).unwrap();

        assert_eq!(ctx.recv_response().unwrap_err(), HsmError::Aborted);
        assert_eq!(ctx.stats().responses_aborted, 1);
    }

    struct FakeCryptoBridge {
        fail_register: bool,
        registered: std::sync::Arc<std::sync::atomic::AtomicBool>,
        unregistered: std::sync::Arc<std::sync::atomic::AtomicBool>,
    }

    impl CryptoBridge for FakeCryptoBridge {
        fn register(&self) -> Result<(), HsmError> {
            if self.fail_register {
                return Err(HsmError::Locked);
            }
            self.registered.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        fn unregister(&self) {
            self.unregistered.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[test]
    fn init_registers_crypto_bridge_and_cleanup_releases_it() {
        let registered = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let unregistered = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let bridge = FakeCryptoBridge {
            fail_register: false,
            registered: registered.clone(),
            unregistered: unregistered.clone(),
        };

        let (t, _peer) = MemTransport::pair();
        let mut ctx =
            ClientContext::init(ClientConfig::comm_only(t, 1).with_crypto(Box::new(bridge)))
                .unwrap();
        assert!(registered.load(std::sync::atomic::Ordering::SeqCst));
        assert!(!unregistered.load(std::sync::atomic::Ordering::SeqCst));

        ctx.cleanup();
        assert!(unregistered.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn init_fails_and_tears_down_when_crypto_registration_fails() {
        let registered = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let unregistered = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let bridge = FakeCryptoBridge {
            fail_register: true,
            registered: registered.clone(),
            unregistered: unregistered.clone(),
        };

        let (t, _peer) = MemTransport::pair();
        let err =
            ClientContext::init(ClientConfig::comm_only(t, 1).with_crypto(Box::new(bridge)))
                .unwrap_err();
        assert_eq!(err, HsmError::Locked);
        assert!(!registered.load(std::sync::atomic::Ordering::SeqCst));
    }
}
