//! Public surface of the HSM client protocol driver.
//!
//! Re-exports the wire structs, transport abstraction, framing layer, and
//! the client driver. Enable the `crypto` feature for the provider bridge.

pub use hsmc_comm::{CommClient, CommError, RecvOutcome};
pub use hsmc_client::{
    ClientContext, ExportedKey, HsmError, HsmStats, RecvStatus, SendStatus,
};
pub use hsmc_transport::{MemTransport, Status, Transport, TransportError};
pub use hsmc_wire::*;

#[cfg(feature = "crypto")]
pub use hsmc_crypto::{cb_slot, dispatch, CryptoRegistration, DevCtx, HsmAesKey,
    HsmCurve25519Key, HsmEccKey, HsmRng, HsmRsaKey, rng_fill};
