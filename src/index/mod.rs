//! Index Module
//!
//! The on-disk hash index of one block: maps a 64-bit segment key to the
//! `SegmentMeta` locating its payload in the block data file. Separate
//! chaining over mapped memory, with deleted nodes recycled through an
//! intrusive free list.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ IndexHeader (44 bytes)                                       │
//! │   BlockInfo (28) | BucketCount: u32 (4)                      │
//! │   DataFileOffset: u32 (4) | IndexFileSize: u32 (4)           │
//! │   FreeHead: i32 (4)                                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Bucket Table (BucketCount × 4 bytes)                         │
//! │   [Head: i32] per bucket — arena-relative, -1 = empty        │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Node Arena (IndexFileSize - 44 - BucketCount×4 bytes in use) │
//! │   [Key: u64][SegmentMeta (8)][Next: i32]                     │
//! │   ... 20-byte nodes, append-only, slots recycled in place .. │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bucket heads, node `Next` links, and the header `FreeHead` are all byte
//! offsets relative to the start of the Node Arena; `-1` is the shared
//! empty/end-of-chain sentinel. Offset 0 is the valid first node, which is
//! why the sentinel cannot be 0.

mod handler;
mod header;
mod node;

pub use handler::{FindResult, IndexHandler};
pub use header::IndexHeader;
pub use node::Node;

// =============================================================================
// Shared Constants (used by header, node, handler)
// =============================================================================

/// Header size: BlockInfo (28) + 4 × u32/i32 fields = 44 bytes
pub(crate) const HEADER_SIZE: u32 = 44;

/// Size of one bucket-table slot (an i32 chain head)
pub(crate) const BUCKET_SLOT_SIZE: u32 = 4;

/// Node size: Key (8) + SegmentMeta (8) + Next (4) = 20 bytes
pub(crate) const NODE_SIZE: u32 = 20;

/// Sentinel link value: empty bucket, end of chain, empty free list
pub(crate) const NIL_LINK: i32 = -1;
