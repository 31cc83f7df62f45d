//! Index node
//!
//! One fixed-size arena record: a segment key, its metadata, and a link.
//! The link doubles as the collision-chain `next` while the node is live
//! and as the free-list `next` once it has been reclaimed; a node is never
//! on both at once.

use crate::block::SegmentMeta;
use crate::error::Result;
use crate::IndexError;

use super::{NIL_LINK, NODE_SIZE};

/// A node in the index arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// 64-bit segment key (exact-match only)
    pub key: u64,
    /// Metadata payload stored for the key
    pub meta: SegmentMeta,
    /// Arena-relative offset of the next node in the chain (or free list)
    pub next: Option<u32>,
}

impl Node {
    /// Encoded size in bytes
    pub const SIZE: usize = NODE_SIZE as usize;

    /// Encode into `buf` (must be at least `SIZE` bytes)
    pub fn encode(&self, buf: &mut [u8]) {
        buf[0..8].copy_from_slice(&self.key.to_le_bytes());
        self.meta.encode(&mut buf[8..16]);
        buf[16..20].copy_from_slice(&encode_link(self.next).to_le_bytes());
    }

    /// Decode from `buf` (must be at least `SIZE` bytes)
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Ok(Self {
            key: u64::from_le_bytes(buf[0..8].try_into().unwrap()),
            meta: SegmentMeta::decode(&buf[8..16]),
            next: decode_link(i32::from_le_bytes(buf[16..20].try_into().unwrap()))?,
        })
    }
}

// =============================================================================
// Link Encoding
// =============================================================================
//
// Logic code only ever sees Option<u32>; the raw sentinel encoding exists
// solely at this byte boundary.

/// Encode a tagged link as its on-disk i32 representation
pub(crate) fn encode_link(link: Option<u32>) -> i32 {
    match link {
        Some(offset) => offset as i32,
        None => NIL_LINK,
    }
}

/// Decode an on-disk i32 link. Any negative value other than the sentinel
/// is corruption, not a valid offset.
pub(crate) fn decode_link(raw: i32) -> Result<Option<u32>> {
    match raw {
        NIL_LINK => Ok(None),
        offset if offset >= 0 => Ok(Some(offset as u32)),
        other => Err(IndexError::Corrupt(format!(
            "invalid link offset {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let node = Node {
            key: 0xDEAD_BEEF_CAFE_F00D,
            meta: SegmentMeta::new(1024, 256),
            next: Some(40),
        };
        let mut buf = [0u8; Node::SIZE];
        node.encode(&mut buf);
        assert_eq!(Node::decode(&buf).unwrap(), node);
    }

    #[test]
    fn nil_link_roundtrip() {
        assert_eq!(encode_link(None), -1);
        assert_eq!(decode_link(-1).unwrap(), None);
        assert_eq!(decode_link(0).unwrap(), Some(0));
    }

    #[test]
    fn negative_link_is_corrupt() {
        assert!(decode_link(-2).is_err());
    }
}
