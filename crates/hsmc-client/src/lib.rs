//! The client protocol driver: the single-outstanding-request state
//! machine, typed key-management commands, and this crate's error
//! taxonomy.

mod commands;
mod config;
mod context;
mod error;
mod stats;

pub use commands::ExportedKey;
pub use config::{ClientConfig, CommClientConfig, CryptoBridge};
pub use context::{ClientContext, RecvStatus, SendStatus};
pub use error::{HsmError, RC_ABORTED, RC_BADARGS, RC_LOCKED, RC_NOHANDLER, RC_NOTFOUND, RC_OK};
pub use stats::HsmStats;
