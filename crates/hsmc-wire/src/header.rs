//! The 16-byte frame header prepended to every request and response.
//!
//! Layout (little-endian, packed, no padding): `magic, kind, size, req_id,
//! client_id, reserved`. This is the wire contract between peers; the
//! in-memory [`Header`] representation is a plain struct and is encoded /
//! decoded explicitly rather than relied upon for its Rust layout.

/// Size in bytes of the encoded header.
pub const HEADER_LEN: usize = 16;

/// Magic value recognized by a native (same-endianness) peer.
pub const MAGIC_NATIVE: u16 = 0xA5A5;

/// Magic value indicating the peer is big-endian relative to us; structured
/// payload fields must be byte-swapped on receive. Unused until cross-endian
/// interop is implemented — see `Header::decode`.
pub const MAGIC_SWAPPED: u16 = 0x5A5A;

/// Frame header. Every field is transmitted little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub magic: u16,
    pub kind: u16,
    pub size: u16,
    pub req_id: u16,
    pub client_id: u32,
    pub reserved: u32,
}

const _: () = assert!(HEADER_LEN == 2 + 2 + 2 + 2 + 4 + 4);

impl Header {
    pub fn new(kind: u16, req_id: u16, client_id: u32, size: u16) -> Self {
        Header {
            magic: MAGIC_NATIVE,
            kind,
            size,
            req_id,
            client_id,
            reserved: 0,
        }
    }

    /// Encode into a fixed-size little-endian byte array.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..2].copy_from_slice(&self.magic.to_le_bytes());
        buf[2..4].copy_from_slice(&self.kind.to_le_bytes());
        buf[4..6].copy_from_slice(&self.size.to_le_bytes());
        buf[6..8].copy_from_slice(&self.req_id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.client_id.to_le_bytes());
        buf[12..16].copy_from_slice(&self.reserved.to_le_bytes());
        buf
    }

    /// Decode from a byte slice of at least [`HEADER_LEN`] bytes.
    ///
    /// Returns `None` if `buf` is too short. Does not validate `magic`;
    /// callers that need swap detection check `magic` against
    /// [`MAGIC_NATIVE`]/[`MAGIC_SWAPPED`] themselves.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(Header {
            magic: u16::from_le_bytes(buf[0..2].try_into().unwrap()),
            kind: u16::from_le_bytes(buf[2..4].try_into().unwrap()),
            size: u16::from_le_bytes(buf[4..6].try_into().unwrap()),
            req_id: u16::from_le_bytes(buf[6..8].try_into().unwrap()),
            client_id: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            reserved: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
        })
    }

    pub fn is_native(&self) -> bool {
        self.magic == MAGIC_NATIVE
    }
}
