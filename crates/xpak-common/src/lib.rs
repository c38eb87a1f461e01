//! Common utilities for xpak.
//!
//! This crate provides the foundational types used across the xpak crates:
//!
//! - [`BinaryReader`] - Bounds-checked binary reading from byte slices
//! - [`BinaryWriter`] - Append-only binary serialization
//! - [`Endian`] - Target byte order for on-disk integer fields
//! - [`crc`] - CRC-32 (zlib polynomial) hashing utilities

mod endian;
mod error;
mod reader;
mod writer;

pub mod crc;

pub use endian::Endian;
pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
