//! Block aggregate record
//!
//! 28-byte summary of a block, embedded at the head of the index header.
//! The index maintains it as an exact function of the live-segment set:
//! every committed insert/delete applies one delta, nothing else touches it.
//!
//! ## Layout (28 bytes, little-endian)
//! ```text
//! [ block_id: u32 ][ version: u32 ][ file_count: u32 ][ size: u32 ]
//! [ del_file_count: u32 ][ del_size: u32 ][ seq_no: u32 ]
//! ```

use crate::error::Result;
use crate::IndexError;

/// Direction of a block-info delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOp {
    /// A segment was inserted into the block
    Insert,
    /// A segment was deleted from the block
    Delete,
}

/// Per-block aggregate counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockInfo {
    /// Id of the owning block
    pub block_id: u32,
    /// Bumped on every committed mutation
    pub version: u32,
    /// Number of live segments in the block
    pub file_count: u32,
    /// Total bytes of live segment payloads
    pub size: u32,
    /// Number of segments deleted over the block's lifetime
    pub del_file_count: u32,
    /// Total bytes of deleted segment payloads
    pub del_size: u32,
    /// Monotone insert counter (next segment sequence number)
    pub seq_no: u32,
}

impl BlockInfo {
    /// Encoded size in bytes
    pub const SIZE: usize = 28;

    /// A fresh record for a newly created block
    pub fn new(block_id: u32) -> Self {
        Self {
            block_id,
            ..Self::default()
        }
    }

    /// Apply a signed delta for one committed insert or delete.
    ///
    /// Fails with `Corrupt` if a decrement would underflow — that can only
    /// mean the counters and the live-node set have diverged.
    pub fn apply(&mut self, op: BlockOp, segment_size: u32) -> Result<()> {
        match op {
            BlockOp::Insert => {
                self.file_count += 1;
                self.size += segment_size;
                self.seq_no += 1;
            }
            BlockOp::Delete => {
                self.file_count = self.file_count.checked_sub(1).ok_or_else(|| {
                    IndexError::Corrupt("block file_count underflow on delete".into())
                })?;
                self.size = self.size.checked_sub(segment_size).ok_or_else(|| {
                    IndexError::Corrupt("block size underflow on delete".into())
                })?;
                self.del_file_count += 1;
                self.del_size += segment_size;
            }
        }
        self.version += 1;
        Ok(())
    }

    /// Encode into `buf` (must be at least `SIZE` bytes)
    pub fn encode(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.block_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.file_count.to_le_bytes());
        buf[12..16].copy_from_slice(&self.size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.del_file_count.to_le_bytes());
        buf[20..24].copy_from_slice(&self.del_size.to_le_bytes());
        buf[24..28].copy_from_slice(&self.seq_no.to_le_bytes());
    }

    /// Decode from `buf` (must be at least `SIZE` bytes)
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            block_id: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            version: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            file_count: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            size: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
            del_file_count: u32::from_le_bytes(buf[16..20].try_into().unwrap()),
            del_size: u32::from_le_bytes(buf[20..24].try_into().unwrap()),
            seq_no: u32::from_le_bytes(buf[24..28].try_into().unwrap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut info = BlockInfo::new(42);
        info.apply(BlockOp::Insert, 100).unwrap();
        info.apply(BlockOp::Insert, 50).unwrap();
        info.apply(BlockOp::Delete, 100).unwrap();

        let mut buf = [0u8; BlockInfo::SIZE];
        info.encode(&mut buf);
        assert_eq!(BlockInfo::decode(&buf), info);
    }

    #[test]
    fn deltas() {
        let mut info = BlockInfo::new(1);
        info.apply(BlockOp::Insert, 100).unwrap();
        assert_eq!(info.file_count, 1);
        assert_eq!(info.size, 100);
        assert_eq!(info.seq_no, 1);

        info.apply(BlockOp::Delete, 100).unwrap();
        assert_eq!(info.file_count, 0);
        assert_eq!(info.size, 0);
        assert_eq!(info.del_file_count, 1);
        assert_eq!(info.del_size, 100);
        assert_eq!(info.version, 2);
    }

    #[test]
    fn delete_underflow_is_corrupt() {
        let mut info = BlockInfo::new(1);
        assert!(matches!(
            info.apply(BlockOp::Delete, 10),
            Err(IndexError::Corrupt(_))
        ));
    }
}
