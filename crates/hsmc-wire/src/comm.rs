//! Fixed-layout bodies for the COMM group: Init, Close, Echo.

use crate::constants::ECHO_MAX;

/// `CommInitReq { client_id: u32 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommInitReq {
    pub client_id: u32,
}

impl CommInitReq {
    pub const LEN: usize = 4;

    pub fn encode(&self) -> [u8; Self::LEN] {
        self.client_id.to_le_bytes()
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(CommInitReq {
            client_id: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
        })
    }
}

/// `CommInitRes { client_id: u32, server_id: u32 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommInitRes {
    pub client_id: u32,
    pub server_id: u32,
}

impl CommInitRes {
    pub const LEN: usize = 8;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..4].copy_from_slice(&self.client_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.server_id.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(CommInitRes {
            client_id: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            server_id: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
        })
    }
}

/// `CommLenData { len: u16, data: [u8; ECHO_MAX] }`, shared by Echo request
/// and response (spec.md §4.4).
#[derive(Debug, Clone, Copy)]
pub struct CommLenData {
    pub len: u16,
    pub data: [u8; ECHO_MAX],
}

impl CommLenData {
    pub const LEN: usize = 2 + ECHO_MAX;

    /// Build from a byte slice, truncating silently to `ECHO_MAX` bytes
    /// (spec.md §4.4 rule 2).
    pub fn from_slice(bytes: &[u8]) -> Self {
        let truncated = &bytes[..bytes.len().min(ECHO_MAX)];
        let mut data = [0u8; ECHO_MAX];
        data[..truncated.len()].copy_from_slice(truncated);
        CommLenData {
            len: truncated.len() as u16,
            data,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..2].copy_from_slice(&self.len.to_le_bytes());
        buf[2..].copy_from_slice(&self.data);
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        let len = u16::from_le_bytes(buf[0..2].try_into().unwrap());
        let mut data = [0u8; ECHO_MAX];
        data.copy_from_slice(&buf[2..Self::LEN]);
        Some(CommLenData { len, data })
    }
}

impl PartialEq for CommLenData {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}
impl Eq for CommLenData {}
