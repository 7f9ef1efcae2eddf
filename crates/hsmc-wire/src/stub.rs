//! The stub: the fixed prefix of every response payload, carrying the
//! server's return code.
//!
//! `spec.md` §3 calls this a "2-byte stub" in prose but also gives its
//! field type as `rc: i32`. We resolve the inconsistency in favor of the
//! explicit field type — `rc` is a 4-byte little-endian signed integer —
//! since that is what makes the rest of §3's invariant
//! (`sizeof(stub) + sizeof(body) + variable_tail`) checkable. See
//! DESIGN.md for the write-up of this decision.

/// Size in bytes of the encoded stub.
pub const STUB_LEN: usize = 4;

/// Fixed prefix of every response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stub {
    /// Server return code. Zero means success; nonzero is surfaced to the
    /// caller verbatim regardless of transport/header validity (spec.md
    /// §4.4 rule 4).
    pub rc: i32,
}

const _: () = assert!(STUB_LEN == 4);

impl Stub {
    pub fn ok() -> Self {
        Stub { rc: 0 }
    }

    pub fn is_ok(&self) -> bool {
        self.rc == 0
    }

    pub fn encode(&self) -> [u8; STUB_LEN] {
        self.rc.to_le_bytes()
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < STUB_LEN {
            return None;
        }
        Some(Stub {
            rc: i32::from_le_bytes(buf[0..STUB_LEN].try_into().unwrap()),
        })
    }
}
