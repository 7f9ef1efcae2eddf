//! Fixed-layout wire structs for the HSM client protocol: the frame header,
//! message kind encoding, and the per-group request/response bodies.
//!
//! Every type here is encoded and decoded explicitly with
//! `to_le_bytes`/`from_le_bytes`; none of it relies on Rust's in-memory
//! struct layout matching the wire.

mod comm;
mod constants;
mod custom;
mod header;
mod key;
mod kind;
mod stub;

pub use comm::*;
pub use constants::*;
pub use custom::*;
pub use header::*;
pub use key::*;
pub use kind::*;
pub use stub::*;
