//! Error types for blockidx
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using IndexError
pub type Result<T> = std::result::Result<T, IndexError>;

/// Unified error type for blockidx operations
#[derive(Debug, Error)]
pub enum IndexError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("index file already exists for block {0}")]
    AlreadyExists(u32),

    #[error("index file not found for block {0}")]
    BlockNotFound(u32),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("key not found")]
    NotFound,

    #[error("key already present")]
    DuplicateKey,

    // -------------------------------------------------------------------------
    // Layout Errors
    // -------------------------------------------------------------------------
    #[error("index corrupt: {0}")]
    Corrupt(String),

    #[error("mapped region cannot grow: need {needed} bytes, max is {max}")]
    NoSpace { needed: u64, max: u64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
