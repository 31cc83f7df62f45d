//! Configuration for blockidx
//!
//! Centralized mapping configuration with sensible defaults.

/// Growth policy for a mapped index file.
///
/// An index file starts at whatever size the header and bucket table need
/// and grows in `grow_step` chunks as nodes are appended, never past
/// `max_map_size`.
#[derive(Debug, Clone, Copy)]
pub struct MapConfig {
    // -------------------------------------------------------------------------
    // Mapping Configuration
    // -------------------------------------------------------------------------
    /// Floor for the size of a freshly created index file (in bytes). The
    /// file is created at the larger of this and what the header plus bucket
    /// table require, so small tables get room for their first nodes without
    /// an immediate grow.
    pub initial_map_size: u64,

    /// Chunk size for growing the mapping when the arena runs out of room
    /// (in bytes).
    pub grow_step: u64,

    /// Hard cap on the mapped file size (in bytes). Growth past this fails
    /// with `NoSpace`.
    pub max_map_size: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_map_size: 128 * 1024,       // 128 KB
            grow_step: 256 * 1024,              // 256 KB
            max_map_size: 64 * 1024 * 1024,     // 64 MB
        }
    }
}

impl MapConfig {
    /// Create a new config builder
    pub fn builder() -> MapConfigBuilder {
        MapConfigBuilder::default()
    }
}

/// Builder for MapConfig
#[derive(Default)]
pub struct MapConfigBuilder {
    config: MapConfig,
}

impl MapConfigBuilder {
    /// Set the minimum initial mapping size (in bytes)
    pub fn initial_map_size(mut self, size: u64) -> Self {
        self.config.initial_map_size = size;
        self
    }

    /// Set the growth chunk size (in bytes)
    pub fn grow_step(mut self, size: u64) -> Self {
        self.config.grow_step = size;
        self
    }

    /// Set the maximum mapped file size (in bytes)
    pub fn max_map_size(mut self, size: u64) -> Self {
        self.config.max_map_size = size;
        self
    }

    pub fn build(self) -> MapConfig {
        self.config
    }
}
