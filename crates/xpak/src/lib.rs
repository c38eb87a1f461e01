//! xpak - embedded ZIP/PAK container library.
//!
//! This crate provides a unified interface to the xpak library ecosystem
//! for building and mounting the ZIP-format pak files game levels embed.
//!
//! # Crates
//!
//! - [`xpak_common`] - Common utilities (endian-aware binary I/O, CRC-32)
//! - [`xpak_zip`] - The container engine (ZIP records, LZMA codec,
//!   alignment, disk write cache)
//!
//! # Example
//!
//! ```
//! use xpak::prelude::*;
//!
//! // Build an aligned pak.
//! let mut pak = ZipContainer::new(NameCase::Insensitive);
//! pak.force_alignment(true, true, 512);
//! pak.add_buffer("materials/wall.vmt", b"shader data", false, CompressionMethod::Lzma)?;
//! let bytes = pak.save_to_buffer()?;
//!
//! // Mount it back.
//! let mut mounted = ZipContainer::new(NameCase::Insensitive);
//! mounted.parse_from_buffer(&bytes)?;
//! assert_eq!(mounted.read("materials/wall.vmt", false)?, b"shader data");
//! # Ok::<(), xpak::zip::Error>(())
//! ```

// Re-export all sub-crates
pub use xpak_common as common;
pub use xpak_zip as zip;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use xpak_common::{crc, BinaryReader, BinaryWriter, Endian};
    pub use xpak_zip::{
        BufferSink, CompressionMethod, FileSink, NameCase, StreamSink, ZipContainer, ZipEntry,
    };
}

// Re-export commonly used types at the crate root
pub use xpak_zip::{CompressionMethod, NameCase, ZipContainer};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
