//! Index Handler
//!
//! Orchestrates one block's index file: lifecycle (create/load/flush/
//! destroy), the chained-hash engine over mapped memory, free-list
//! recycling, and the block-level aggregate bookkeeping that must move in
//! lockstep with every insert and delete.
//!
//! ## Concurrency Model
//!
//! No internal locking. At most one mutating call may be in flight against
//! a handler at a time; concurrent reads are safe only while no write is in
//! flight. Callers that share a handler across threads serialize all calls
//! behind their own lock — the intended deployment is one writer per block.

use std::fs;
use std::path::Path;

use crate::block::{index_path, BlockInfo, BlockOp, SegmentMeta};
use crate::config::MapConfig;
use crate::error::Result;
use crate::mmap::MappedFile;
use crate::IndexError;

use super::header::{IndexHeader, OFF_BLOCK_INFO, OFF_DATA_OFFSET, OFF_FILE_SIZE, OFF_FREE_HEAD};
use super::node::{decode_link, encode_link, Node};
use super::{BUCKET_SLOT_SIZE, HEADER_SIZE, NODE_SIZE};

/// Outcome of a chain walk for one key.
///
/// On a hit, `current` is the matching node and `previous` its in-chain
/// predecessor (`None` when the match is the bucket head). On a miss,
/// `current` is `None` and `previous` is the chain's tail (`None` for an
/// empty bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindResult {
    /// Arena-relative offset of the matching node
    pub current: Option<u32>,
    /// Arena-relative offset of the predecessor (hit) or chain tail (miss)
    pub previous: Option<u32>,
}

/// Handler for one block's on-disk hash index
pub struct IndexHandler {
    /// Mapped index file (header + bucket table + node arena)
    map: MappedFile,

    /// Id of the owning block
    block_id: u32,

    /// Bucket-table size, immutable after create/load
    bucket_count: u32,

    /// File offset of the first node slot (= header + bucket table)
    nodes_base: u32,
}

impl IndexHandler {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create the index file for `block_id` and map it.
    ///
    /// The file starts sized for the header and bucket table (floored at
    /// `config.initial_map_size`), with every bucket empty, counters zero,
    /// and an empty free list.
    pub fn create(
        data_dir: &Path,
        block_id: u32,
        bucket_count: u32,
        config: &MapConfig,
    ) -> Result<Self> {
        validate_bucket_count(bucket_count)?;

        let path = index_path(data_dir, block_id);
        if path.exists() {
            return Err(IndexError::AlreadyExists(block_id));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let nodes_base = HEADER_SIZE + bucket_count * BUCKET_SLOT_SIZE;
        let map = MappedFile::create(&path, u64::from(nodes_base), *config)?;
        let mut handler = Self {
            map,
            block_id,
            bucket_count,
            nodes_base,
        };

        let header = IndexHeader {
            block_info: BlockInfo::new(block_id),
            bucket_count,
            data_file_offset: 0,
            index_file_size: nodes_base,
            free_head: None,
        };
        header.encode(&mut handler.map.as_mut_slice()[..IndexHeader::SIZE]);
        for bucket in 0..bucket_count {
            handler.set_bucket_head(bucket, None);
        }

        tracing::debug!(
            "created index for block {} ({} buckets)",
            block_id,
            bucket_count
        );
        Ok(handler)
    }

    /// Load and map an existing index file for `block_id`.
    ///
    /// The requested `bucket_count` must match the one the file was created
    /// with; a mismatch, a truncated file, or an in-use size that disagrees
    /// with the file length is reported as `Corrupt`.
    pub fn load(
        data_dir: &Path,
        block_id: u32,
        bucket_count: u32,
        config: &MapConfig,
    ) -> Result<Self> {
        validate_bucket_count(bucket_count)?;

        let path = index_path(data_dir, block_id);
        if !path.exists() {
            return Err(IndexError::BlockNotFound(block_id));
        }

        let map = MappedFile::open(&path, *config)?;
        if map.len() < u64::from(HEADER_SIZE) {
            return Err(IndexError::Corrupt(format!(
                "index file is {} bytes, smaller than the header",
                map.len()
            )));
        }

        let header = IndexHeader::decode(&map.as_slice()[..IndexHeader::SIZE])?;
        if header.bucket_count != bucket_count {
            return Err(IndexError::Corrupt(format!(
                "bucket count mismatch: file has {}, requested {}",
                header.bucket_count, bucket_count
            )));
        }

        let nodes_base = HEADER_SIZE + bucket_count * BUCKET_SLOT_SIZE;
        if header.index_file_size < nodes_base
            || u64::from(header.index_file_size) > map.len()
            || (header.index_file_size - nodes_base) % NODE_SIZE != 0
        {
            return Err(IndexError::Corrupt(format!(
                "in-use size {} inconsistent with file length {}",
                header.index_file_size,
                map.len()
            )));
        }

        tracing::debug!(
            "loaded index for block {} ({} buckets, {} bytes in use)",
            block_id,
            bucket_count,
            header.index_file_size
        );
        Ok(Self {
            map,
            block_id,
            bucket_count,
            nodes_base,
        })
    }

    /// Flush all pending writes to stable storage. The only durability
    /// point; no mutating call syncs implicitly.
    pub fn flush(&mut self) -> Result<()> {
        self.map.flush()
    }

    /// Unmap and delete the backing file.
    pub fn destroy(self) -> Result<()> {
        let block_id = self.block_id;
        self.map.delete()?;
        tracing::debug!("destroyed index for block {}", block_id);
        Ok(())
    }

    /// Delete the index file for `block_id` without loading it. Succeeds if
    /// the file is already gone.
    pub fn remove(data_dir: &Path, block_id: u32) -> Result<()> {
        let path = index_path(data_dir, block_id);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("removed index for block {}", block_id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Segment Metadata Operations
    // =========================================================================

    /// Insert the metadata record for `key`.
    ///
    /// Fails with `DuplicateKey` if the key is present — there is no silent
    /// overwrite; callers delete first. On success the block counters have
    /// absorbed the insert. Returns the node's arena-relative offset.
    pub fn write_segment_meta(&mut self, key: u64, meta: SegmentMeta) -> Result<u32> {
        if self.hash_find(key)?.current.is_some() {
            return Err(IndexError::DuplicateKey);
        }
        let offset = self.hash_insert(key, meta)?;
        self.update_block_info(BlockOp::Insert, meta.size)?;
        Ok(offset)
    }

    /// Read the metadata record for `key`. Pure lookup, no mutation.
    pub fn read_segment_meta(&self, key: u64) -> Result<SegmentMeta> {
        match self.hash_find(key)?.current {
            Some(offset) => Ok(self.read_node(offset)?.meta),
            None => Err(IndexError::NotFound),
        }
    }

    /// Delete the metadata record for `key`.
    ///
    /// Unlinks the node from its chain and pushes it onto the free list —
    /// bytes are never erased and the arena never shrinks. Returns the
    /// deleted record so the caller can reclaim data-file space.
    pub fn delete_segment_meta(&mut self, key: u64) -> Result<SegmentMeta> {
        let FindResult { current, previous } = self.hash_find(key)?;
        let Some(current) = current else {
            return Err(IndexError::NotFound);
        };

        // All fallible reads happen before the first byte is mutated, so a
        // failure here leaves the index untouched.
        let node = self.read_node(current)?;
        let free_head = self.free_head()?;
        let prev_node = match previous {
            Some(prev) => Some((prev, self.read_node(prev)?)),
            None => None,
        };

        // Unlink from the chain
        match prev_node {
            None => self.set_bucket_head(self.bucket_of(key), node.next),
            Some((prev, mut prev_node)) => {
                prev_node.next = node.next;
                self.write_node(prev, &prev_node)?;
            }
        }

        // Push onto the free list
        let freed = Node {
            next: free_head,
            ..node
        };
        self.write_node(current, &freed)?;
        self.set_free_head(Some(current));

        self.update_block_info(BlockOp::Delete, node.meta.size)?;
        Ok(node.meta)
    }

    // =========================================================================
    // Hash Engine
    // =========================================================================

    /// Walk the chain for `key`'s bucket. Side-effect free; exact 64-bit
    /// equality is the only match criterion.
    ///
    /// The walk is cycle-guarded: visiting more nodes than the arena holds
    /// is reported as `Corrupt` instead of looping forever.
    pub fn hash_find(&self, key: u64) -> Result<FindResult> {
        let max_steps = (self.index_file_size() - self.nodes_base) / NODE_SIZE;
        let mut previous = None;
        let mut cursor = self.bucket_head(self.bucket_of(key))?;
        let mut steps = 0u32;

        while let Some(offset) = cursor {
            if steps >= max_steps {
                return Err(IndexError::Corrupt(format!(
                    "chain for bucket {} exceeds {} nodes",
                    self.bucket_of(key),
                    max_steps
                )));
            }
            let node = self.read_node(offset)?;
            if node.key == key {
                return Ok(FindResult {
                    current: Some(offset),
                    previous,
                });
            }
            previous = Some(offset);
            cursor = node.next;
            steps += 1;
        }

        // Miss: `previous` is the chain tail (None for an empty bucket).
        Ok(FindResult {
            current: None,
            previous,
        })
    }

    /// Materialize a node for `(key, meta)` and link it at the head of its
    /// bucket's chain.
    ///
    /// Slot selection follows the recycling policy: pop the free list if it
    /// is non-empty, otherwise append at the end of the in-use arena,
    /// growing the mapping if the file is out of room. A failed grow leaves
    /// the index untouched.
    ///
    /// Does not check for duplicates; `write_segment_meta` is the checked
    /// entry point.
    pub fn hash_insert(&mut self, key: u64, meta: SegmentMeta) -> Result<u32> {
        let bucket = self.bucket_of(key);
        let old_head = self.bucket_head(bucket)?;

        let offset = match self.free_head()? {
            // Reuse a reclaimed slot; its stored link is the rest of the
            // free list.
            Some(offset) => {
                let freed = self.read_node(offset)?;
                self.set_free_head(freed.next);
                offset
            }
            // Append a fresh node at the end of the in-use region.
            None => {
                let position = self.index_file_size();
                self.map
                    .ensure_capacity(u64::from(position) + u64::from(NODE_SIZE))?;
                self.set_index_file_size(position + NODE_SIZE);
                position - self.nodes_base
            }
        };

        let node = Node {
            key,
            meta,
            next: old_head,
        };
        self.write_node(offset, &node)?;
        self.set_bucket_head(bucket, Some(offset));
        Ok(offset)
    }

    // =========================================================================
    // Block Bookkeeping
    // =========================================================================

    /// Apply one insert/delete delta to the block counters. Called exactly
    /// once per successful mutation and never independently, so the
    /// counters stay an exact function of the live-node set.
    fn update_block_info(&mut self, op: BlockOp, segment_size: u32) -> Result<()> {
        let mut info = self.block_info();
        info.apply(op, segment_size)?;
        info.encode(&mut self.map.as_mut_slice()[OFF_BLOCK_INFO..OFF_BLOCK_INFO + BlockInfo::SIZE]);
        Ok(())
    }

    /// Advance the data-file write cursor by `size` bytes after the caller
    /// has written a payload to the companion data file. The index never
    /// verifies the write actually happened — that guarantee is the
    /// caller's.
    pub fn commit_data_offset(&mut self, size: u32) {
        let advanced = self.data_file_offset() + size;
        self.write_header_u32(OFF_DATA_OFFSET, advanced);
    }

    // =========================================================================
    // Read-Only Accessors
    // =========================================================================

    /// Id of the owning block
    pub fn block_id(&self) -> u32 {
        self.block_id
    }

    /// Number of bucket-table slots
    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Decoded copy of the index header
    pub fn header(&self) -> Result<IndexHeader> {
        IndexHeader::decode(&self.map.as_slice()[..IndexHeader::SIZE])
    }

    /// Decoded copy of the block aggregate counters
    pub fn block_info(&self) -> BlockInfo {
        BlockInfo::decode(&self.map.as_slice()[OFF_BLOCK_INFO..OFF_BLOCK_INFO + BlockInfo::SIZE])
    }

    /// Next unused byte offset in the companion data file
    pub fn data_file_offset(&self) -> u32 {
        self.read_header_u32(OFF_DATA_OFFSET)
    }

    /// File offset of the first node slot (base for arena-relative offsets)
    pub fn arena_offset(&self) -> u32 {
        self.nodes_base
    }

    /// Keys of one bucket's chain, in link order (most recent insert
    /// first). Diagnostics helper.
    pub fn bucket_keys(&self, bucket: u32) -> Result<Vec<u64>> {
        if bucket >= self.bucket_count {
            return Err(IndexError::InvalidArgument(format!(
                "bucket {} out of range ({} buckets)",
                bucket, self.bucket_count
            )));
        }
        let max_steps = (self.index_file_size() - self.nodes_base) / NODE_SIZE;
        let mut keys = Vec::new();
        let mut cursor = self.bucket_head(bucket)?;
        while let Some(offset) = cursor {
            if keys.len() as u32 >= max_steps {
                return Err(IndexError::Corrupt(format!(
                    "chain for bucket {bucket} exceeds {max_steps} nodes"
                )));
            }
            let node = self.read_node(offset)?;
            keys.push(node.key);
            cursor = node.next;
        }
        Ok(keys)
    }

    // =========================================================================
    // Internal: Layout Arithmetic
    // =========================================================================

    fn bucket_of(&self, key: u64) -> u32 {
        (key % u64::from(self.bucket_count)) as u32
    }

    fn bucket_slot_pos(&self, bucket: u32) -> usize {
        (HEADER_SIZE + bucket * BUCKET_SLOT_SIZE) as usize
    }

    fn bucket_head(&self, bucket: u32) -> Result<Option<u32>> {
        let pos = self.bucket_slot_pos(bucket);
        let raw = i32::from_le_bytes(self.map.as_slice()[pos..pos + 4].try_into().unwrap());
        decode_link(raw)
    }

    fn set_bucket_head(&mut self, bucket: u32, head: Option<u32>) {
        let pos = self.bucket_slot_pos(bucket);
        self.map.as_mut_slice()[pos..pos + 4].copy_from_slice(&encode_link(head).to_le_bytes());
    }

    /// File position of the node at arena-relative `offset`, bounds-checked
    /// against the in-use region and node alignment.
    fn node_pos(&self, offset: u32) -> Result<usize> {
        let in_use = self.index_file_size();
        let pos = self.nodes_base + offset;
        if offset % NODE_SIZE != 0 || pos + NODE_SIZE > in_use {
            return Err(IndexError::Corrupt(format!(
                "node offset {offset} outside in-use arena"
            )));
        }
        Ok(pos as usize)
    }

    fn read_node(&self, offset: u32) -> Result<Node> {
        let pos = self.node_pos(offset)?;
        Node::decode(&self.map.as_slice()[pos..pos + Node::SIZE])
    }

    fn write_node(&mut self, offset: u32, node: &Node) -> Result<()> {
        let pos = self.node_pos(offset)?;
        node.encode(&mut self.map.as_mut_slice()[pos..pos + Node::SIZE]);
        Ok(())
    }

    // =========================================================================
    // Internal: Header Field Access
    // =========================================================================

    fn read_header_u32(&self, field_offset: usize) -> u32 {
        u32::from_le_bytes(
            self.map.as_slice()[field_offset..field_offset + 4]
                .try_into()
                .unwrap(),
        )
    }

    fn write_header_u32(&mut self, field_offset: usize, value: u32) {
        self.map.as_mut_slice()[field_offset..field_offset + 4]
            .copy_from_slice(&value.to_le_bytes());
    }

    fn index_file_size(&self) -> u32 {
        self.read_header_u32(OFF_FILE_SIZE)
    }

    fn set_index_file_size(&mut self, size: u32) {
        self.write_header_u32(OFF_FILE_SIZE, size);
    }

    fn free_head(&self) -> Result<Option<u32>> {
        let raw = i32::from_le_bytes(
            self.map.as_slice()[OFF_FREE_HEAD..OFF_FREE_HEAD + 4]
                .try_into()
                .unwrap(),
        );
        decode_link(raw)
    }

    fn set_free_head(&mut self, head: Option<u32>) {
        self.map.as_mut_slice()[OFF_FREE_HEAD..OFF_FREE_HEAD + 4]
            .copy_from_slice(&encode_link(head).to_le_bytes());
    }
}

/// The bucket table must be non-empty and `header + table` must fit the u32
/// offset arithmetic the layout uses.
fn validate_bucket_count(bucket_count: u32) -> Result<()> {
    if bucket_count == 0 {
        return Err(IndexError::InvalidArgument(
            "bucket_count must be non-zero".into(),
        ));
    }
    if bucket_count > (u32::MAX - HEADER_SIZE) / BUCKET_SLOT_SIZE {
        return Err(IndexError::InvalidArgument(format!(
            "bucket_count {bucket_count} overflows the index layout"
        )));
    }
    Ok(())
}
