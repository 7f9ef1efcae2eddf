//! Plain configuration structs for [`ClientContext::init`], matching
//! spec.md §6's `ClientConfig { comm: &CommClientConfig }` /
//! `CommClientConfig { transport_cb, transport_context, transport_config,
//! client_id }`. Constructed programmatically by the caller, same as the
//! teacher's own config structs — no config-file parsing crate involved.

use crate::error::HsmError;

/// Transport-side half of [`ClientConfig`]. The generic `Transport` impl
/// already plays the role spec.md's `transport_cb` vtable plays, so the
/// three C-style transport fields collapse to one typed `transport: T`.
pub struct CommClientConfig<T> {
    pub transport: T,
    pub client_id: u32,
}

impl<T> CommClientConfig<T> {
    pub fn new(transport: T, client_id: u32) -> Self {
        CommClientConfig { transport, client_id }
    }
}

/// Hook a caller installs to bring up and tear down the optional crypto
/// provider bridge (spec.md §4.3, §4.6) as part of [`ClientContext::init`]
/// and [`ClientContext::cleanup`]. `hsmc-crypto` implements this over its
/// process-wide registration; `hsmc-client` has no dependency on that
/// crate, so the bridge is always installed through this trait object.
pub trait CryptoBridge: Send {
    /// Registers the bridge. Called once during `init`.
    fn register(&self) -> Result<(), HsmError>;
    /// Releases the bridge. Called during `cleanup`; must not panic.
    fn unregister(&self);
}

/// Configuration passed to [`ClientContext::init`] (spec.md §6's
/// `ClientConfig`).
pub struct ClientConfig<T> {
    pub comm: CommClientConfig<T>,
    pub crypto: Option<Box<dyn CryptoBridge>>,
}

impl<T> ClientConfig<T> {
    /// A config with the crypto bridge left disabled.
    pub fn comm_only(transport: T, client_id: u32) -> Self {
        ClientConfig {
            comm: CommClientConfig::new(transport, client_id),
            crypto: None,
        }
    }

    /// Installs `bridge` to be registered during `init` and released during
    /// `cleanup`.
    pub fn with_crypto(mut self, bridge: Box<dyn CryptoBridge>) -> Self {
        self.crypto = Some(bridge);
        self
    }
}
