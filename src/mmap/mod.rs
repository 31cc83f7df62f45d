//! Mapping Module
//!
//! File-backed mutable byte regions. Everything above this layer treats a
//! mapped index file as a plain `&mut [u8]`; this module owns the unsafe
//! mmap surface and the grow/flush/delete lifecycle.

mod region;

pub use region::MappedFile;
