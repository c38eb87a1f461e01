//! Error types for the container engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when building or parsing pak archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] xpak_common::Error),

    /// Invalid ZIP record signature.
    #[error("bad signature: expected {expected:#010x}, got {actual:#010x}")]
    BadSignature { expected: u32, actual: u32 },

    /// The archive ended before a complete record could be read.
    #[error("archive truncated while reading {0}")]
    TruncatedArchive(&'static str),

    /// Compression method other than stored (0) or LZMA (14).
    #[error("unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u16),

    /// The encoder for the requested method is not compiled in.
    #[error("compression support for this method is not compiled in")]
    CompressionUnavailable,

    /// The compressor produced no usable output.
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// Decompression error from the underlying codec.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Decompression consumed or produced a different byte count than recorded.
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    DecompressionMismatch { expected: u64, actual: u64 },

    /// CRC of the decompressed payload does not match the stored checksum.
    #[error("CRC mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// A source file to add, or an archive to mount, could not be opened.
    #[error("source file not found: {0}")]
    SourceFileNotFound(PathBuf),

    /// Reading payload bytes back from the mounted archive failed.
    #[error("failed reading mounted archive: {0}")]
    SourceReadFailed(std::io::Error),
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;
