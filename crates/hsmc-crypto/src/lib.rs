//! Crypto provider bridge: lets a host crypto library offload key-bound
//! operations to the HSM by referencing opaque key identifiers, without
//! implementing any cryptographic algorithm itself (spec.md §4.6 Non-goal).

mod bridge;
mod devctx;
mod keys;
mod registry;

pub use bridge::{cb_slot, dispatch, rng_fill};
pub use devctx::DevCtx;
pub use keys::{HsmAesKey, HsmCurve25519Key, HsmEccKey, HsmRng, HsmRsaKey};
pub use registry::{
    ClientConfigCryptoExt, ClientCryptoBridge, CryptoRegistration, DEFAULT_DEV_ID,
};
