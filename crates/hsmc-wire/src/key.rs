//! Fixed-layout bodies for the KEY group: Cache, Evict, Export, Commit,
//! Erase (spec.md §4.4, §4.5).

use crate::constants::NVM_LABEL_LEN;

/// Wire identifier for a cached or committed key.
pub type KeyId = u16;

/// `KeyCacheReq { id: KeyId, flags: u32, sz: u32, label_sz: u32,
/// label: [u8; NVM_LABEL_LEN] }` followed by `sz` raw key bytes.
///
/// If the caller's label is longer than `NVM_LABEL_LEN`, only the first
/// `NVM_LABEL_LEN` bytes are carried in `label`, but `label_sz` still
/// records the length as supplied (spec.md §4.4 rule 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCacheReq {
    pub id: KeyId,
    pub flags: u32,
    pub label_sz: u32,
    pub label: [u8; NVM_LABEL_LEN],
    pub key_bytes: Vec<u8>,
}

impl KeyCacheReq {
    pub const FIXED_LEN: usize = 2 + 4 + 4 + 4 + NVM_LABEL_LEN;

    pub fn new(id: KeyId, flags: u32, label: &[u8], key_bytes: Vec<u8>) -> Self {
        let label_sz = label.len() as u32;
        let copied = &label[..label.len().min(NVM_LABEL_LEN)];
        let mut fixed_label = [0u8; NVM_LABEL_LEN];
        fixed_label[..copied.len()].copy_from_slice(copied);
        KeyCacheReq {
            id,
            flags,
            label_sz,
            label: fixed_label,
            key_bytes,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let sz = self.key_bytes.len() as u32;
        let mut buf = Vec::with_capacity(Self::FIXED_LEN + self.key_bytes.len());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.extend_from_slice(&self.flags.to_le_bytes());
        buf.extend_from_slice(&sz.to_le_bytes());
        buf.extend_from_slice(&self.label_sz.to_le_bytes());
        buf.extend_from_slice(&self.label);
        buf.extend_from_slice(&self.key_bytes);
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::FIXED_LEN {
            return None;
        }
        let id = u16::from_le_bytes(buf[0..2].try_into().unwrap());
        let flags = u32::from_le_bytes(buf[2..6].try_into().unwrap());
        let sz = u32::from_le_bytes(buf[6..10].try_into().unwrap());
        let label_sz = u32::from_le_bytes(buf[10..14].try_into().unwrap());
        let mut label = [0u8; NVM_LABEL_LEN];
        label.copy_from_slice(&buf[14..Self::FIXED_LEN]);
        let tail = &buf[Self::FIXED_LEN..];
        if (tail.len() as u64) < sz as u64 {
            return None;
        }
        Some(KeyCacheReq {
            id,
            flags,
            label_sz,
            label,
            key_bytes: tail[..sz as usize].to_vec(),
        })
    }
}

/// `KeyCacheRes { id: KeyId }`: the id the server actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyCacheRes {
    pub id: KeyId,
}

impl KeyCacheRes {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        self.id.to_le_bytes()
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(KeyCacheRes {
            id: u16::from_le_bytes(buf[0..2].try_into().unwrap()),
        })
    }
}

/// `KeyEvictReq { id: KeyId }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvictReq {
    pub id: KeyId,
}

impl KeyEvictReq {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        self.id.to_le_bytes()
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(KeyEvictReq {
            id: u16::from_le_bytes(buf[0..2].try_into().unwrap()),
        })
    }
}

/// `KeyExportReq { id: KeyId }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyExportReq {
    pub id: KeyId,
}

impl KeyExportReq {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        self.id.to_le_bytes()
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(KeyExportReq {
            id: u16::from_le_bytes(buf[0..2].try_into().unwrap()),
        })
    }
}

/// `KeyExportRes { len: u32, label: [u8; NVM_LABEL_LEN] }` followed by `len`
/// raw key bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExportRes {
    pub label: [u8; NVM_LABEL_LEN],
    pub key_bytes: Vec<u8>,
}

impl KeyExportRes {
    pub const FIXED_LEN: usize = 4 + NVM_LABEL_LEN;

    pub fn new(label: &[u8], key_bytes: Vec<u8>) -> Self {
        let copied = &label[..label.len().min(NVM_LABEL_LEN)];
        let mut fixed_label = [0u8; NVM_LABEL_LEN];
        fixed_label[..copied.len()].copy_from_slice(copied);
        KeyExportRes {
            label: fixed_label,
            key_bytes,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let len = self.key_bytes.len() as u32;
        let mut buf = Vec::with_capacity(Self::FIXED_LEN + self.key_bytes.len());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&self.label);
        buf.extend_from_slice(&self.key_bytes);
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::FIXED_LEN {
            return None;
        }
        let len = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let mut label = [0u8; NVM_LABEL_LEN];
        label.copy_from_slice(&buf[4..Self::FIXED_LEN]);
        let tail = &buf[Self::FIXED_LEN..];
        if (tail.len() as u64) < len as u64 {
            return None;
        }
        Some(KeyExportRes {
            label,
            key_bytes: tail[..len as usize].to_vec(),
        })
    }
}

/// `KeyCommitReq { id: KeyId }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyCommitReq {
    pub id: KeyId,
}

impl KeyCommitReq {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        self.id.to_le_bytes()
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(KeyCommitReq {
            id: u16::from_le_bytes(buf[0..2].try_into().unwrap()),
        })
    }
}

/// `KeyEraseReq { id: KeyId }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEraseReq {
    pub id: KeyId,
}

impl KeyEraseReq {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        self.id.to_le_bytes()
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(KeyEraseReq {
            id: u16::from_le_bytes(buf[0..2].try_into().unwrap()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_cache_req_roundtrip() {
        let req = KeyCacheReq::new(0, 0, b"session-key", vec![1, 2, 3, 4, 5]);
        let bytes = req.encode();
        let decoded = KeyCacheReq::decode(&bytes).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn key_cache_req_truncates_label_but_keeps_reported_len() {
        let long_label = vec![b'x'; NVM_LABEL_LEN + 10];
        let req = KeyCacheReq::new(0, 0, &long_label, vec![]);
        assert_eq!(req.label_sz as usize, long_label.len());
        assert_eq!(&req.label[..], &long_label[..NVM_LABEL_LEN]);
    }

    #[test]
    fn key_cache_req_rejects_truncated_tail() {
        let req = KeyCacheReq::new(0, 0, b"k", vec![9; 10]);
        let mut bytes = req.encode();
        bytes.truncate(bytes.len() - 5);
        assert!(KeyCacheReq::decode(&bytes).is_none());
    }

    #[test]
    fn key_cache_res_roundtrip() {
        let res = KeyCacheRes { id: 42 };
        assert_eq!(KeyCacheRes::decode(&res.encode()).unwrap(), res);
    }

    #[test]
    fn key_export_res_roundtrip_with_data() {
        let res = KeyExportRes::new(b"aes-key-1", vec![0xde, 0xad, 0xbe, 0xef]);
        let bytes = res.encode();
        assert_eq!(KeyExportRes::decode(&bytes).unwrap(), res);
    }

    #[test]
    fn key_export_res_empty_data() {
        let res = KeyExportRes::new(b"label", vec![]);
        let bytes = res.encode();
        let decoded = KeyExportRes::decode(&bytes).unwrap();
        assert!(decoded.key_bytes.is_empty());
    }

    #[test]
    fn key_evict_export_commit_erase_req_roundtrip() {
        let evict = KeyEvictReq { id: 11 };
        assert_eq!(KeyEvictReq::decode(&evict.encode()).unwrap(), evict);

        let export = KeyExportReq { id: 11 };
        assert_eq!(KeyExportReq::decode(&export.encode()).unwrap(), export);

        let commit = KeyCommitReq { id: 11 };
        assert_eq!(KeyCommitReq::decode(&commit.encode()).unwrap(), commit);

        let erase = KeyEraseReq { id: 11 };
        assert_eq!(KeyEraseReq::decode(&erase.encode()).unwrap(), erase);
    }
}
