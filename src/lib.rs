//! # blockidx
//!
//! A memory-mapped, on-disk hash index for block storage with:
//! - A fixed little-endian file layout interpreted in place (no copies)
//! - Separate-chaining collision resolution over mapped memory
//! - Tombstone-free deletion: reclaimed nodes feed an intrusive free list
//! - Block-level aggregate counters kept in lockstep with every mutation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       IndexHandler                          │
//! │   create / load / flush / destroy · hash engine · free      │
//! │   list · block bookkeeping                                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ interprets bytes as
//!          ┌────────────┼───────────────┐
//!          ▼            ▼               ▼
//!   ┌────────────┐ ┌────────────┐ ┌────────────┐
//!   │ IndexHeader│ │ BucketTable│ │ Node Arena │
//!   │  (44 B)    │ │ (i32 heads)│ │ (20 B each)│
//!   └────────────┘ └────────────┘ └────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │  MappedFile  │
//!               │  (memmap2)   │
//!               └──────────────┘
//! ```
//!
//! One handler owns one block's index file exclusively. The companion data
//! file that holds segment payloads is never touched here — the index only
//! records where each payload starts and how long it is.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod mmap;
pub mod block;
pub mod index;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{IndexError, Result};
pub use config::MapConfig;
pub use block::{index_path, BlockInfo, BlockOp, SegmentMeta};
pub use index::{FindResult, IndexHandler, IndexHeader};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of blockidx
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
