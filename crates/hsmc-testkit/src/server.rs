//! A minimal in-process server that answers requests over a [`Transport`]
//! the way a real HSM server would, well enough to exercise every
//! operation in spec.md §8's testable properties.
//!
//! This is scaffolding for tests, not a reference server implementation;
//! spec.md explicitly puts the server-side dispatch loop out of scope
//! except for the wire contract it must honor.

use std::collections::{HashMap, HashSet};

use hsmc_transport::{Status, Transport};
use hsmc_wire::{
    comm_action, custom_action, key_action, unpack, CommInitRes, CommLenData, CustomCbResponse,
    Group, Header, KeyCacheReq, KeyCacheRes, KeyEvictReq, KeyExportReq, KeyExportRes, KeyId,
    Stub, CUSTOM_MAX, HEADER_LEN, KEYID_ERASED,
};

use hsmc_client::{RC_BADARGS, RC_NOHANDLER, RC_NOTFOUND, RC_OK};

#[derive(Debug, Clone)]
struct KeyEntry {
    label: Vec<u8>,
    bytes: Vec<u8>,
}

/// Fake HSM server driving one or more [`Transport`] endpoints, one per
/// connected client. Key state (`cache`/`persistent`) is shared across all
/// of them, the way a real server shares state across client connections.
pub struct FakeServer<T> {
    transports: Vec<T>,
    server_id: u32,
    next_key_id: u16,
    cache: HashMap<(u32, KeyId), KeyEntry>,
    persistent: HashMap<KeyId, KeyEntry>,
    custom_handlers: HashSet<u32>,
}

impl<T: Transport> FakeServer<T> {
    pub fn new(transport: T, server_id: u32) -> Self {
        FakeServer {
            transports: vec![transport],
            server_id,
            next_key_id: 1,
            cache: HashMap::new(),
            persistent: HashMap::new(),
            custom_handlers: HashSet::new(),
        }
    }

    /// Connects another client's transport endpoint to this same server,
    /// sharing its key state.
    pub fn add_client(&mut self, transport: T) {
        self.transports.push(transport);
    }

    /// Makes the fake server answer `CustomCb` calls at `cb_id` instead of
    /// reporting `NOHANDLER`. The echoed response carries the request's
    /// own payload back with `err = 0`.
    pub fn register_custom_handler(&mut self, cb_id: u32) {
        self.custom_handlers.insert(cb_id);
    }

    fn alloc_key_id(&mut self) -> KeyId {
        let id = self.next_key_id;
        self.next_key_id = self.next_key_id.wrapping_add(1);
        if self.next_key_id == KEYID_ERASED {
            self.next_key_id = 1;
        }
        id
    }

    /// Processes at most one request across all connected clients,
    /// replying on the transport it arrived on. Returns `true` if a
    /// request was handled, `false` if none was ready.
    pub fn poll_once(&mut self) -> bool {
        for i in 0..self.transports.len() {
            let mut buf = [0u8; hsmc_wire::COMM_MTU];
            let (status, n) = match self.transports[i].recv(&mut buf) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if status == Status::NotReady {
                continue;
            }
            let Some(header) = Header::decode(&buf[..n]) else {
                continue;
            };
            let body = &buf[HEADER_LEN..n];
            let (rc, resp_body) = self.handle(&header, body);

            let mut payload = Stub { rc }.encode().to_vec();
            payload.extend_from_slice(&resp_body);
            let resp_header = Header::new(
                header.kind,
                header.req_id,
                header.client_id,
                payload.len() as u16,
            );
            let mut frame = resp_header.encode().to_vec();
            frame.extend_from_slice(&payload);

            // The test harness owns both ends of a bounded in-memory
            // queue; a reply always fits, so one attempt suffices.
            let _ = self.transports[i].send(&frame);
            return true;
        }
        false
    }

    /// Polls until a request is handled or `max_polls` non-blocking
    /// attempts have found nothing, whichever comes first.
    pub fn run_until_handled(&mut self, max_polls: usize) -> bool {
        for _ in 0..max_polls {
            if self.poll_once() {
                return true;
            }
        }
        false
    }

    fn handle(&mut self, header: &Header, body: &[u8]) -> (i32, Vec<u8>) {
        let Ok((group, action)) = unpack(header.kind) else {
            return (RC_BADARGS, Vec::new());
        };
        match (group, action) {
            (Group::Comm, comm_action::INIT) => {
                let res = CommInitRes {
                    client_id: header.client_id,
                    server_id: self.server_id,
                };
                (RC_OK, res.encode().to_vec())
            }
            (Group::Comm, comm_action::CLOSE) => (RC_OK, Vec::new()),
            (Group::Comm, comm_action::ECHO) => match CommLenData::decode(body) {
                Some(req) => (RC_OK, CommLenData::from_slice(req.as_slice()).encode().to_vec()),
                None => (RC_BADARGS, Vec::new()),
            },
            (Group::Key, key_action::CACHE) => self.handle_key_cache(header.client_id, body),
            (Group::Key, key_action::EVICT) => self.handle_key_evict(header.client_id, body),
            (Group::Key, key_action::EXPORT) => self.handle_key_export(header.client_id, body),
            (Group::Key, key_action::COMMIT) => self.handle_key_commit(header.client_id, body),
            (Group::Key, key_action::ERASE) => self.handle_key_erase(header.client_id, body),
            (Group::Custom, custom_action::CALL) => self.handle_custom(body),
            _ => (RC_BADARGS, Vec::new()),
        }
    }

    fn handle_key_cache(&mut self, client_id: u32, body: &[u8]) -> (i32, Vec<u8>) {
        let Some(req) = KeyCacheReq::decode(body) else {
            return (RC_BADARGS, Vec::new());
        };
        let id = if req.id == KEYID_ERASED {
            self.alloc_key_id()
        } else {
            req.id
        };
        self.cache.insert(
            (client_id, id),
            KeyEntry {
                label: req.label.to_vec(),
                bytes: req.key_bytes,
            },
        );
        (RC_OK, KeyCacheRes { id }.encode().to_vec())
    }

    fn handle_key_evict(&mut self, client_id: u32, body: &[u8]) -> (i32, Vec<u8>) {
        let Some(req) = KeyEvictReq::decode(body) else {
            return (RC_BADARGS, Vec::new());
        };
        match self.cache.remove(&(client_id, req.id)) {
            Some(_) => (RC_OK, Vec::new()),
            None => (RC_NOTFOUND, Vec::new()),
        }
    }

    fn handle_key_export(&mut self, client_id: u32, body: &[u8]) -> (i32, Vec<u8>) {
        let Some(req) = KeyExportReq::decode(body) else {
            return (RC_BADARGS, Vec::new());
        };
        let entry = self
            .cache
            .get(&(client_id, req.id))
            .or_else(|| self.persistent.get(&req.id));
        match entry {
            Some(entry) => {
                let res = KeyExportRes::new(&entry.label, entry.bytes.clone());
                (RC_OK, res.encode())
            }
            None => (RC_NOTFOUND, Vec::new()),
        }
    }

    fn handle_key_commit(&mut self, client_id: u32, body: &[u8]) -> (i32, Vec<u8>) {
        let Some(req) = hsmc_wire::KeyCommitReq::decode(body) else {
            return (RC_BADARGS, Vec::new());
        };
        match self.cache.get(&(client_id, req.id)) {
            Some(entry) => {
                self.persistent.insert(req.id, entry.clone());
                (RC_OK, Vec::new())
            }
            None => (RC_NOTFOUND, Vec::new()),
        }
    }

    fn handle_key_erase(&mut self, client_id: u32, body: &[u8]) -> (i32, Vec<u8>) {
        let Some(req) = hsmc_wire::KeyEraseReq::decode(body) else {
            return (RC_BADARGS, Vec::new());
        };
        let had_cache = self.cache.remove(&(client_id, req.id)).is_some();
        let had_persistent = self.persistent.remove(&req.id).is_some();
        if had_cache || had_persistent {
            (RC_OK, Vec::new())
        } else {
            (RC_NOTFOUND, Vec::new())
        }
    }

    fn handle_custom(&mut self, body: &[u8]) -> (i32, Vec<u8>) {
        let Some(req) = hsmc_wire::CustomCbRequest::decode(body) else {
            return (RC_BADARGS, Vec::new());
        };
        if !self.custom_handlers.contains(&req.id) {
            let res = CustomCbResponse {
                id: req.id as u16,
                kind: req.kind,
                err: RC_NOHANDLER,
                data: [0u8; CUSTOM_MAX],
            };
            return (RC_OK, res.encode().to_vec());
        }
        let res = CustomCbResponse {
            id: req.id as u16,
            kind: req.kind,
            err: 0,
            data: req.data,
        };
        (RC_OK, res.encode().to_vec())
    }
}
