//! Fixed-layout bodies for the CUSTOM group: host-defined callback dispatch
//! (spec.md §2 component C3, §3, §4.4).

use crate::constants::CUSTOM_MAX;

/// Discriminator carried in `CustomCb_Request`/`CustomCb_Response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CustomCbKind {
    Query = 1,
    Invoke = 2,
}

impl CustomCbKind {
    pub fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            1 => CustomCbKind::Query,
            2 => CustomCbKind::Invoke,
            _ => return None,
        })
    }
}

/// `CustomCb_Request { id: u32, type: u16, data: [u8; CUSTOM_MAX] }`
#[derive(Debug, Clone, Copy)]
pub struct CustomCbRequest {
    pub id: u32,
    pub kind: u16,
    pub data: [u8; CUSTOM_MAX],
}

impl CustomCbRequest {
    pub const LEN: usize = 4 + 2 + CUSTOM_MAX;

    pub fn new(id: u32, kind: CustomCbKind, payload: &[u8]) -> Self {
        let truncated = &payload[..payload.len().min(CUSTOM_MAX)];
        let mut data = [0u8; CUSTOM_MAX];
        data[..truncated.len()].copy_from_slice(truncated);
        CustomCbRequest {
            id,
            kind: kind as u16,
            data,
        }
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..4].copy_from_slice(&self.id.to_le_bytes());
        buf[4..6].copy_from_slice(&self.kind.to_le_bytes());
        buf[6..].copy_from_slice(&self.data);
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        let id = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let kind = u16::from_le_bytes(buf[4..6].try_into().unwrap());
        let mut data = [0u8; CUSTOM_MAX];
        data.copy_from_slice(&buf[6..Self::LEN]);
        Some(CustomCbRequest { id, kind, data })
    }
}

impl PartialEq for CustomCbRequest {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind && self.data[..] == other.data[..]
    }
}
impl Eq for CustomCbRequest {}

/// `CustomCb_Response { id: u16, type: u16, err: i32, data: [u8; CUSTOM_MAX] }`
///
/// Note `id` narrows from `u32` in the request to `u16` here; the server
/// only ever names a callback slot in `0..N_CUSTOM_CB`, which fits in 16
/// bits, but the request's `id` field is wider (spec.md §4.4 sizes are
/// binding even where the two widths don't match).
#[derive(Debug, Clone, Copy)]
pub struct CustomCbResponse {
    pub id: u16,
    pub kind: u16,
    pub err: i32,
    pub data: [u8; CUSTOM_MAX],
}

impl CustomCbResponse {
    pub const LEN: usize = 2 + 2 + 4 + CUSTOM_MAX;

    pub fn new(id: u16, kind: CustomCbKind, err: i32, payload: &[u8]) -> Self {
        let truncated = &payload[..payload.len().min(CUSTOM_MAX)];
        let mut data = [0u8; CUSTOM_MAX];
        data[..truncated.len()].copy_from_slice(truncated);
        CustomCbResponse {
            id,
            kind: kind as u16,
            err,
            data,
        }
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..2].copy_from_slice(&self.id.to_le_bytes());
        buf[2..4].copy_from_slice(&self.kind.to_le_bytes());
        buf[4..8].copy_from_slice(&self.err.to_le_bytes());
        buf[8..].copy_from_slice(&self.data);
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        let id = u16::from_le_bytes(buf[0..2].try_into().unwrap());
        let kind = u16::from_le_bytes(buf[2..4].try_into().unwrap());
        let err = i32::from_le_bytes(buf[4..8].try_into().unwrap());
        let mut data = [0u8; CUSTOM_MAX];
        data.copy_from_slice(&buf[8..Self::LEN]);
        Some(CustomCbResponse {
            id,
            kind,
            err,
            data,
        })
    }
}

impl PartialEq for CustomCbResponse {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.err == other.err
            && self.data[..] == other.data[..]
    }
}
impl Eq for CustomCbResponse {}
