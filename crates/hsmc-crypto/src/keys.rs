//! Algorithm object wrappers. Each carries a [`DevCtx`] slot the bridge
//! reads to decide between "use the cached HSM key" and "cache ephemeral
//! material, use it, evict on teardown" (spec.md §4.6).

use crate::devctx::DevCtx;

macro_rules! hsm_key_wrapper {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            dev_ctx: DevCtx,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    dev_ctx: DevCtx::unset(),
                }
            }

            pub fn dev_ctx(&self) -> DevCtx {
                self.dev_ctx
            }

            pub fn bind_key(&mut self, key_id: hsmc_wire::KeyId) {
                self.dev_ctx.set(key_id);
            }

            pub fn unbind_key(&mut self) {
                self.dev_ctx.clear();
            }
        }
    };
}

hsm_key_wrapper!(HsmAesKey, "AES symmetric key object bound to an HSM slot.");
hsm_key_wrapper!(HsmRsaKey, "RSA key object bound to an HSM slot.");
hsm_key_wrapper!(HsmEccKey, "ECC key object bound to an HSM slot.");
hsm_key_wrapper!(
    HsmCurve25519Key,
    "Curve25519 key object bound to an HSM slot."
);

/// RNG object. Has no key material to bind, only a callback target.
#[derive(Debug, Clone, Copy, Default)]
pub struct HsmRng;

impl HsmRng {
    pub fn new() -> Self {
        HsmRng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_key_has_no_bound_id() {
        let key = HsmAesKey::new();
        assert_eq!(key.dev_ctx().key_id(), None);
    }

    #[test]
    fn bind_then_unbind() {
        let mut key = HsmRsaKey::new();
        key.bind_key(3);
        assert_eq!(key.dev_ctx().key_id(), Some(3));
        key.unbind_key();
        assert_eq!(key.dev_ctx().key_id(), None);
    }
}
