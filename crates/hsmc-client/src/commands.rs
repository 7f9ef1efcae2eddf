//! Typed command entry points (spec.md §4.4, §4.5): one pair of
//! `Xxx_Request`/`Xxx_Response` per `(group, action)`, wrapped in a
//! convenience method that drives [`ClientContext::send_and_recv`].

use hsmc_transport::Transport;
use hsmc_wire::{
    comm_action, custom_action, key_action, CommInitReq, CommInitRes, CommLenData,
    CustomCbKind, CustomCbRequest, CustomCbResponse, Group, KeyCacheReq, KeyCacheRes,
    KeyCommitReq, KeyEraseReq, KeyEvictReq, KeyExportReq, KeyExportRes, KeyId,
};

use crate::context::{split_stub, ClientContext};
use crate::error::HsmError;

/// Key material and label returned by [`ClientContext::key_export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedKey {
    pub label: Vec<u8>,
    pub key_bytes: Vec<u8>,
}

impl<T: Transport> ClientContext<T> {
    /// Opens the comm channel against the server, returning its `server_id`.
    pub fn comm_init(&mut self) -> Result<u32, HsmError> {
        let req = CommInitReq {
            client_id: self.client_id(),
        };
        let payload = self.send_and_recv(Group::Comm, comm_action::INIT, &req.encode())?;
        let body = split_stub(&payload)?;
        let res = CommInitRes::decode(body).ok_or(HsmError::Aborted)?;
        Ok(res.server_id)
    }

    /// Closes the comm channel. Per the open question in spec.md §9, a
    /// server-confirmed close fully tears down this context rather than
    /// leaving it half-alive.
    pub fn comm_close(&mut self) -> Result<(), HsmError> {
        let payload = self.send_and_recv(Group::Comm, comm_action::CLOSE, &[])?;
        split_stub(&payload)?;
        self.cleanup();
        Ok(())
    }

    /// Round-trips `data` through the server unchanged, truncating silently
    /// to `ECHO_MAX` bytes (spec.md §4.4 rule 2, §8 invariants 2 and 7).
    pub fn echo(&mut self, data: &[u8]) -> Result<Vec<u8>, HsmError> {
        let req = CommLenData::from_slice(data);
        let payload = self.send_and_recv(Group::Comm, comm_action::ECHO, &req.encode())?;
        let body = split_stub(&payload)?;
        let res = CommLenData::decode(body).ok_or(HsmError::Aborted)?;
        Ok(res.as_slice().to_vec())
    }

    /// Caches `key_bytes` under `label`, requesting `id` (pass
    /// `KEYID_ERASED` to let the server allocate a fresh one). Returns the
    /// id the server actually used.
    pub fn key_cache(
        &mut self,
        id: KeyId,
        flags: u32,
        label: &[u8],
        key_bytes: Vec<u8>,
    ) -> Result<KeyId, HsmError> {
        let req = KeyCacheReq::new(id, flags, label, key_bytes);
        let payload = self.send_and_recv(Group::Key, key_action::CACHE, &req.encode())?;
        let body = split_stub(&payload)?;
        let res = KeyCacheRes::decode(body).ok_or(HsmError::Aborted)?;
        Ok(res.id)
    }

    /// Drops `id` from this client's in-RAM cache. `NotFound` if `id`
    /// belongs to a different client or doesn't exist (spec.md §4.5).
    pub fn key_evict(&mut self, id: KeyId) -> Result<(), HsmError> {
        let req = KeyEvictReq { id };
        let payload = self.send_and_recv(Group::Key, key_action::EVICT, &req.encode())?;
        split_stub(&payload)?;
        Ok(())
    }

    /// Retrieves key material and label for `id`. Rust's owned `Vec<u8>`
    /// removes the NULL-probe/too-small-buffer dance spec.md §4.4 rule 3
    /// describes for a fixed caller buffer: this always returns the full
    /// key on success.
    pub fn key_export(&mut self, id: KeyId) -> Result<ExportedKey, HsmError> {
        let req = KeyExportReq { id };
        let payload = self.send_and_recv(Group::Key, key_action::EXPORT, &req.encode())?;
        let body = split_stub(&payload)?;
        let res = KeyExportRes::decode(body).ok_or(HsmError::Aborted)?;
        Ok(ExportedKey {
            label: res.label.to_vec(),
            key_bytes: res.key_bytes,
        })
    }

    /// Promotes a cached entry to persistent storage.
    pub fn key_commit(&mut self, id: KeyId) -> Result<(), HsmError> {
        let req = KeyCommitReq { id };
        let payload = self.send_and_recv(Group::Key, key_action::COMMIT, &req.encode())?;
        split_stub(&payload)?;
        Ok(())
    }

    /// Removes `id` from both cache and persistent storage.
    pub fn key_erase(&mut self, id: KeyId) -> Result<(), HsmError> {
        let req = KeyEraseReq { id };
        let payload = self.send_and_recv(Group::Key, key_action::ERASE, &req.encode())?;
        split_stub(&payload)?;
        Ok(())
    }

    /// Queries whether a handler is registered at `cb_id`.
    pub fn custom_query(&mut self, cb_id: u32) -> Result<CustomCbResponse, HsmError> {
        self.custom_call(cb_id, CustomCbKind::Query, &[])
    }

    /// Invokes the handler registered at `cb_id` with `payload`.
    pub fn custom_invoke(
        &mut self,
        cb_id: u32,
        payload: &[u8],
    ) -> Result<CustomCbResponse, HsmError> {
        self.custom_call(cb_id, CustomCbKind::Invoke, payload)
    }

    fn custom_call(
        &mut self,
        cb_id: u32,
        kind: CustomCbKind,
        payload: &[u8],
    ) -> Result<CustomCbResponse, HsmError> {
        let req = CustomCbRequest::new(cb_id, kind, payload);
        let frame_payload =
            self.send_and_recv(Group::Custom, custom_action::CALL, &req.encode())?;
        let body = split_stub(&frame_payload)?;
        let res = CustomCbResponse::decode(body).ok_or(HsmError::Aborted)?;
        if res.err != 0 {
            return Err(HsmError::from_rc(res.err));
        }
        Ok(res)
    }
}
