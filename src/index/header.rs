//! Index header
//!
//! Fixed 44-byte record at offset 0 of the mapped index file. Field offsets
//! are also used directly by the handler for single-field updates, so they
//! are defined once here.

use crate::block::BlockInfo;
use crate::error::Result;

use super::node::{decode_link, encode_link};
use super::HEADER_SIZE;

// Field offsets within the header
pub(crate) const OFF_BLOCK_INFO: usize = 0;
pub(crate) const OFF_BUCKET_COUNT: usize = 28;
pub(crate) const OFF_DATA_OFFSET: usize = 32;
pub(crate) const OFF_FILE_SIZE: usize = 36;
pub(crate) const OFF_FREE_HEAD: usize = 40;

/// Decoded view of the index-file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    /// Aggregate counters for the owning block
    pub block_info: BlockInfo,
    /// Number of bucket-table slots, fixed at creation
    pub bucket_count: u32,
    /// Next unused byte offset in the companion data file
    pub data_file_offset: u32,
    /// Total bytes of header + table + arena in use; the file offset where
    /// the next appended node lands
    pub index_file_size: u32,
    /// Head of the reclaimed-node free list
    pub free_head: Option<u32>,
}

impl IndexHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = HEADER_SIZE as usize;

    /// Encode into `buf` (must be at least `SIZE` bytes)
    pub fn encode(&self, buf: &mut [u8]) {
        self.block_info
            .encode(&mut buf[OFF_BLOCK_INFO..OFF_BLOCK_INFO + BlockInfo::SIZE]);
        buf[OFF_BUCKET_COUNT..OFF_BUCKET_COUNT + 4]
            .copy_from_slice(&self.bucket_count.to_le_bytes());
        buf[OFF_DATA_OFFSET..OFF_DATA_OFFSET + 4]
            .copy_from_slice(&self.data_file_offset.to_le_bytes());
        buf[OFF_FILE_SIZE..OFF_FILE_SIZE + 4]
            .copy_from_slice(&self.index_file_size.to_le_bytes());
        buf[OFF_FREE_HEAD..OFF_FREE_HEAD + 4]
            .copy_from_slice(&encode_link(self.free_head).to_le_bytes());
    }

    /// Decode from `buf` (must be at least `SIZE` bytes)
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Ok(Self {
            block_info: BlockInfo::decode(&buf[OFF_BLOCK_INFO..OFF_BLOCK_INFO + BlockInfo::SIZE]),
            bucket_count: u32::from_le_bytes(
                buf[OFF_BUCKET_COUNT..OFF_BUCKET_COUNT + 4].try_into().unwrap(),
            ),
            data_file_offset: u32::from_le_bytes(
                buf[OFF_DATA_OFFSET..OFF_DATA_OFFSET + 4].try_into().unwrap(),
            ),
            index_file_size: u32::from_le_bytes(
                buf[OFF_FILE_SIZE..OFF_FILE_SIZE + 4].try_into().unwrap(),
            ),
            free_head: decode_link(i32::from_le_bytes(
                buf[OFF_FREE_HEAD..OFF_FREE_HEAD + 4].try_into().unwrap(),
            ))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let header = IndexHeader {
            block_info: BlockInfo::new(7),
            bucket_count: 1021,
            data_file_offset: 4096,
            index_file_size: 44 + 1021 * 4 + 3 * 20,
            free_head: Some(20),
        };
        let mut buf = [0u8; IndexHeader::SIZE];
        header.encode(&mut buf);
        assert_eq!(IndexHeader::decode(&buf).unwrap(), header);
    }
}
