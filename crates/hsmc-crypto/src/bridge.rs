//! Bridges a single crypto operation onto the HSM: either forward it
//! against an already-cached key, or cache ephemeral material, perform the
//! operation, and evict it (spec.md §4.6).
//!
//! The wire-level shape of an actual algorithm operation (AES block
//! layout, RSA padding, ...) is out of scope here per spec.md's Non-goals;
//! this crate forwards the opaque operation payload through the CUSTOM
//! callback dispatch that C3 already exposes, keyed by a well-known
//! callback slot per algorithm family.

use hsmc_client::{ClientContext, HsmError};
use hsmc_transport::Transport;
use hsmc_wire::KEYID_ERASED;

use crate::devctx::DevCtx;

/// Well-known `CustomCb` slots the host crypto library's callback
/// dispatches onto, one per algorithm family.
pub mod cb_slot {
    pub const RNG: u32 = 0;
    pub const AES: u32 = 1;
    pub const RSA: u32 = 2;
    pub const ECC: u32 = 3;
    pub const CURVE25519: u32 = 4;
}

/// Runs `op` against the key named by `dev_ctx`, falling back to
/// cache-then-use with `ephemeral_material` when `dev_ctx` has no bound
/// key. Returns the response payload from the server.
pub fn dispatch<T: Transport>(
    ctx: &mut ClientContext<T>,
    cb_slot: u32,
    dev_ctx: DevCtx,
    ephemeral_material: Option<&[u8]>,
    op_payload: &[u8],
) -> Result<Vec<u8>, HsmError> {
    match dev_ctx.key_id() {
        Some(key_id) => invoke_with_key(ctx, cb_slot, key_id, op_payload),
        None => {
            let material = ephemeral_material.ok_or(HsmError::BadArgs)?;
            cache_then_use(ctx, cb_slot, material, op_payload)
        }
    }
}

fn invoke_with_key<T: Transport>(
    ctx: &mut ClientContext<T>,
    cb_slot: u32,
    key_id: hsmc_wire::KeyId,
    op_payload: &[u8],
) -> Result<Vec<u8>, HsmError> {
    let mut framed = key_id.to_le_bytes().to_vec();
    framed.extend_from_slice(op_payload);
    let res = ctx.custom_invoke(cb_slot, &framed)?;
    Ok(res.data[..res.data.len()].to_vec())
}

fn cache_then_use<T: Transport>(
    ctx: &mut ClientContext<T>,
    cb_slot: u32,
    material: &[u8],
    op_payload: &[u8],
) -> Result<Vec<u8>, HsmError> {
    let key_id = ctx.key_cache(KEYID_ERASED, 0, b"ephemeral", material.to_vec())?;
    let result = invoke_with_key(ctx, cb_slot, key_id, op_payload);
    // Evict regardless of whether the operation itself succeeded; the
    // ephemeral key must not outlive this call.
    let evict_result = ctx.key_evict(key_id);
    result.and_then(|bytes| evict_result.map(|_| bytes))
}

/// Fills `buf` with bytes from the HSM's RNG.
pub fn rng_fill<T: Transport>(ctx: &mut ClientContext<T>, buf: &mut [u8]) -> Result<(), HsmError> {
    let len = buf.len() as u32;
    let res = ctx.custom_invoke(cb_slot::RNG, &len.to_le_bytes())?;
    if res.data.len() < buf.len() {
        return Err(HsmError::Aborted);
    }
    buf.copy_from_slice(&res.data[..buf.len()]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsmc_client::ClientConfig;
    use hsmc_transport::MemTransport;

    #[test]
    fn dispatch_without_key_or_material_is_bad_args() {
        let (t, _peer) = MemTransport::pair();
        let mut ctx = ClientContext::init(ClientConfig::comm_only(t, 1)).unwrap();
        let err = dispatch(&mut ctx, cb_slot::AES, DevCtx::unset(), None, b"plaintext")
            .unwrap_err();
        assert_eq!(err, HsmError::BadArgs);
    }
}
