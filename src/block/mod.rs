//! Block Module
//!
//! Records shared with the companion block-storage layer: the per-block
//! aggregate (`BlockInfo`), the per-segment metadata record (`SegmentMeta`),
//! and the naming scheme for index files.
//!
//! A block is one logical storage unit: one index file (this crate) plus one
//! append-only data file holding segment payloads (companion module).

mod info;
mod meta;

use std::path::{Path, PathBuf};

pub use info::{BlockInfo, BlockOp};
pub use meta::SegmentMeta;

/// Subdirectory of the data dir holding index files
pub(crate) const INDEX_DIR: &str = "index";

/// Path of the index file for a block: `{data_dir}/index/{block_id}`
pub fn index_path(data_dir: &Path, block_id: u32) -> PathBuf {
    data_dir.join(INDEX_DIR).join(block_id.to_string())
}
