//! Build-time constants shared by both peers. Real deployments pick these at
//! compile time and must agree with the server; the values here are the
//! spec's recommended defaults.

/// Maximum payload size of a single transport frame.
pub const COMM_MTU: usize = 1280;

/// Maximum bytes carried by an Echo request/response body.
pub const ECHO_MAX: usize = 128;

/// Fixed width of a key label.
pub const NVM_LABEL_LEN: usize = 24;

/// Maximum bytes carried by a CustomCb request/response body.
pub const CUSTOM_MAX: usize = 64;

/// Number of custom callback slots the server recognizes.
pub const N_CUSTOM_CB: u32 = 8;

/// Sentinel `KeyId` meaning "no key / erased".
pub const KEYID_ERASED: u16 = 0x0000;
