//! Process-wide crypto callback registration (spec.md §5).
//!
//! Only one `ClientContext` may hold the registration under a given
//! `dev_id` at a time; `init` of a second bridge against the same id fails
//! with `Locked` until the first is dropped.

use std::sync::OnceLock;

use parking_lot::Mutex;

use hsmc_client::{ClientConfig, CryptoBridge, HsmError};

/// `dev_id` a caller uses when it doesn't register against a specific
/// device slot of its own (spec.md §4.3: "register... against a well-known
/// `DEV_ID`").
pub const DEFAULT_DEV_ID: u32 = 0;

fn registry() -> &'static Mutex<Option<u32>> {
    static REGISTRY: OnceLock<Mutex<Option<u32>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(None))
}

/// RAII handle for the process-wide registration. Dropping it frees
/// `dev_id` for the next caller.
#[derive(Debug)]
pub struct CryptoRegistration {
    dev_id: u32,
}

impl CryptoRegistration {
    pub fn register(dev_id: u32) -> Result<Self, HsmError> {
        let mut slot = registry().lock();
        if slot.is_some() {
            return Err(HsmError::Locked);
        }
        *slot = Some(dev_id);
        tracing::debug!(dev_id, "registered crypto provider bridge");
        Ok(CryptoRegistration { dev_id })
    }

    pub fn dev_id(&self) -> u32 {
        self.dev_id
    }
}

impl Drop for CryptoRegistration {
    fn drop(&mut self) {
        let mut slot = registry().lock();
        if *slot == Some(self.dev_id) {
            *slot = None;
            tracing::debug!(dev_id = self.dev_id, "released crypto provider bridge");
        }
    }
}

/// The [`CryptoBridge`] hook `ClientContext::init` drives (spec.md §4.3's
/// "if the optional crypto bridge is enabled, initialize... and register
/// the HSM crypto callback against a well-known `DEV_ID`"). Holds the
/// resulting [`CryptoRegistration`] for the lifetime of the owning context.
pub struct ClientCryptoBridge {
    dev_id: u32,
    held: Mutex<Option<CryptoRegistration>>,
}

impl ClientCryptoBridge {
    pub fn new(dev_id: u32) -> Self {
        ClientCryptoBridge {
            dev_id,
            held: Mutex::new(None),
        }
    }
}

impl CryptoBridge for ClientCryptoBridge {
    fn register(&self) -> Result<(), HsmError> {
        let reg = CryptoRegistration::register(self.dev_id)?;
        *self.held.lock() = Some(reg);
        Ok(())
    }

    fn unregister(&self) {
        self.held.lock().take();
    }
}

/// Convenience extension for building a [`ClientConfig`] with the crypto
/// bridge wired in against [`DEFAULT_DEV_ID`].
pub trait ClientConfigCryptoExt<T> {
    fn with_crypto_bridge(self) -> ClientConfig<T>;
}

impl<T> ClientConfigCryptoExt<T> for ClientConfig<T> {
    fn with_crypto_bridge(self) -> ClientConfig<T> {
        self.with_crypto(Box::new(ClientCryptoBridge::new(DEFAULT_DEV_ID)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsmc_client::ClientContext;
    use hsmc_transport::MemTransport;

    #[test]
    fn second_registration_is_locked_until_first_drops() {
        let first = CryptoRegistration::register(42).unwrap();
        assert_eq!(CryptoRegistration::register(42).unwrap_err(), HsmError::Locked);
        drop(first);
        let second = CryptoRegistration::register(42).unwrap();
        assert_eq!(second.dev_id(), 42);
    }

    #[test]
    fn init_rolls_back_when_crypto_registration_conflicts() {
        let dev_id = 4242;
        let _held = CryptoRegistration::register(dev_id).unwrap();

        let (t, _peer) = MemTransport::pair();
        let config =
            ClientConfig::comm_only(t, 1).with_crypto(Box::new(ClientCryptoBridge::new(dev_id)));
        let err = ClientContext::init(config).unwrap_err();
        assert_eq!(err, HsmError::Locked);
    }

    #[test]
    fn cleanup_releases_crypto_registration_for_the_next_context() {
        let dev_id = 4243;
        let (t, _peer) = MemTransport::pair();
        let config =
            ClientConfig::comm_only(t, 1).with_crypto(Box::new(ClientCryptoBridge::new(dev_id)));
        let mut ctx = ClientContext::init(config).unwrap();

        assert_eq!(
            CryptoRegistration::register(dev_id).unwrap_err(),
            HsmError::Locked
        );

        ctx.cleanup();
        let reg = CryptoRegistration::register(dev_id).unwrap();
        assert_eq!(reg.dev_id(), dev_id);
    }
}
