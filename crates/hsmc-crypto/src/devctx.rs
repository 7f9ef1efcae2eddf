//! Explicit device-context handle.
//!
//! spec.md §9 warns against the source's trick of stashing a `keyId` inside
//! a pointer-typed field belonging to an external crypto library via
//! integer-to-pointer conversion. Here the handle is just a typed field on
//! wrapper types this crate owns; there is no pointer to misuse.

use hsmc_wire::KeyId;

/// Smuggles a `KeyId` onto an algorithm object without ever touching a raw
/// pointer. `None` means "no key bound yet" — the bridge falls back to
/// cache-then-use for that object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DevCtx(Option<KeyId>);

impl DevCtx {
    pub fn unset() -> Self {
        DevCtx(None)
    }

    pub fn bound(key_id: KeyId) -> Self {
        DevCtx(Some(key_id))
    }

    pub fn key_id(&self) -> Option<KeyId> {
        self.0
    }

    pub fn set(&mut self, key_id: KeyId) {
        self.0 = Some(key_id);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_has_no_key() {
        assert_eq!(DevCtx::unset().key_id(), None);
    }

    #[test]
    fn set_then_clear() {
        let mut ctx = DevCtx::unset();
        ctx.set(7);
        assert_eq!(ctx.key_id(), Some(7));
        ctx.clear();
        assert_eq!(ctx.key_id(), None);
    }
}
