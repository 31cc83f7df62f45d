//! Mapped region
//!
//! Wraps `memmap2::MmapMut` with the lifecycle the index needs: create a
//! file at a given size, reopen an existing one, grow in configured chunks,
//! flush, and delete. The mapping always covers the whole file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::config::MapConfig;
use crate::error::Result;
use crate::IndexError;

/// A mutable byte region backed by a file on disk.
///
/// The region length always equals the file length. `grow` may remap, so no
/// reference into the region survives a mutating call — callers re-slice
/// through `as_slice`/`as_mut_slice` after every operation that can grow.
pub struct MappedFile {
    path: PathBuf,
    file: File,
    mmap: MmapMut,
    config: MapConfig,
}

impl MappedFile {
    /// Create a new file of `initial_size` bytes (zero-filled) and map it.
    ///
    /// The file size is floored at `config.initial_map_size`. Fails if the
    /// file already exists.
    pub fn create(path: &Path, initial_size: u64, config: MapConfig) -> Result<Self> {
        let size = initial_size.max(config.initial_map_size);
        if size > config.max_map_size {
            return Err(IndexError::NoSpace {
                needed: size,
                max: config.max_map_size,
            });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        file.set_len(size)?;

        // SAFETY: the file is exclusively owned by this handle for the
        // region's lifetime (single-writer model, caller-arbitrated).
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        tracing::debug!("created mapped file {} ({} bytes)", path.display(), size);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mmap,
            config,
        })
    }

    /// Open and map an existing file at its current size.
    pub fn open(path: &Path, config: MapConfig) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Err(IndexError::Corrupt(format!(
                "mapped file {} is empty",
                path.display()
            )));
        }

        // SAFETY: as in `create` — exclusive single-writer ownership.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        tracing::debug!("opened mapped file {} ({} bytes)", path.display(), len);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mmap,
            config,
        })
    }

    /// Current region length (= file length) in bytes.
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Grow the file (and remap) so the region holds at least `needed`
    /// bytes. Growth is rounded up to a multiple of `config.grow_step` and
    /// capped at `config.max_map_size`; a request past the cap fails with
    /// `NoSpace` and leaves the region untouched.
    pub fn ensure_capacity(&mut self, needed: u64) -> Result<()> {
        let current = self.len();
        if needed <= current {
            return Ok(());
        }
        if needed > self.config.max_map_size {
            return Err(IndexError::NoSpace {
                needed,
                max: self.config.max_map_size,
            });
        }

        let step = self.config.grow_step.max(1);
        let grown = current + (needed - current).div_ceil(step) * step;
        let new_len = grown.min(self.config.max_map_size);

        self.file.set_len(new_len)?;
        // SAFETY: remap after resize; the old mapping is dropped on assign.
        self.mmap = unsafe { MmapMut::map_mut(&self.file)? };

        tracing::debug!(
            "grew mapped file {}: {} -> {} bytes",
            self.path.display(),
            current,
            new_len
        );
        Ok(())
    }

    /// Flush dirty pages to stable storage (msync).
    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    /// Read-only view of the whole region.
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// Mutable view of the whole region.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap
    }

    /// Unmap and delete the backing file. Succeeds if the file is already
    /// gone.
    pub fn delete(self) -> Result<()> {
        let path = self.path;
        drop(self.mmap);
        drop(self.file);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!("deleted mapped file {}", path.display());
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
