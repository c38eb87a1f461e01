//! Embedded ZIP/PAK container engine.
//!
//! Implements the archive format game levels embed as a private
//! mini-filesystem: standard ZIP local headers, central directory, and
//! end record, extended with an alignment convention carried in a fixed
//! 32-byte archive comment (`XZP1`/`XZP2`). Supports stored and LZMA
//! payloads, little- and big-endian serialization, CRC-32 verification,
//! and an optional disk-backed write cache for large builds.
//!
//! [`ZipContainer`] is the entry point; see its docs for a usage example.

mod cache;
mod container;
mod entry;
mod error;
mod sink;

pub mod codec;
pub mod text;
pub mod zip;

pub use cache::DiskWriteCache;
pub use container::ZipContainer;
pub use entry::{EntryTable, NameCase, Payload, ZipEntry};
pub use error::{Error, Result};
pub use sink::{BufferSink, FileSink, StreamSink};
pub use zip::CompressionMethod;
