//! Segment metadata record
//!
//! Locates one segment's payload inside a block's data file. The index
//! stores this record verbatim in each node; it never touches the payload
//! bytes themselves.
//!
//! ## Layout (8 bytes, little-endian)
//! ```text
//! [ offset: u32 ][ size: u32 ]
//! ```

/// Where a segment's payload lives in the block data file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentMeta {
    /// Byte offset of the payload inside the data file
    pub offset: u32,
    /// Payload length in bytes
    pub size: u32,
}

impl SegmentMeta {
    /// Encoded size in bytes
    pub const SIZE: usize = 8;

    pub fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// Encode into `buf` (must be at least `SIZE` bytes)
    pub fn encode(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.offset.to_le_bytes());
        buf[4..8].copy_from_slice(&self.size.to_le_bytes());
    }

    /// Decode from `buf` (must be at least `SIZE` bytes)
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            offset: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            size: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let meta = SegmentMeta::new(4096, 512);
        let mut buf = [0u8; SegmentMeta::SIZE];
        meta.encode(&mut buf);
        assert_eq!(SegmentMeta::decode(&buf), meta);
    }
}
