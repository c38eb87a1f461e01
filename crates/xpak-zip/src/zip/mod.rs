//! ZIP record structures.
//!
//! Low-level record types shared by the parser and the serializer. Each
//! record knows its own signature and fixed size; variable-length parts
//! (names, padding, comments) are handled by the container.

mod central_dir;
mod eocd;
mod local;

pub use central_dir::CentralDirectoryHeader;
pub use eocd::{EocdRecord, XzipComment, XZIP_COMMENT_LEN};
pub use local::LocalFileHeader;

/// `version needed to extract` for stored entries.
pub const VERSION_NEEDED_DEFAULT: u16 = 10;

/// `version needed to extract` for LZMA entries (ZIP spec §4.4.3.2).
pub const VERSION_NEEDED_LZMA: u16 = 63;

/// Compression methods admitted by the pak format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    /// No compression (stored).
    Store = 0,
    /// LZMA with the ZIP vendor payload framing.
    Lzma = 14,
}

impl CompressionMethod {
    /// The `version needed to extract` value this method requires.
    pub const fn version_needed(self) -> u16 {
        match self {
            Self::Store => VERSION_NEEDED_DEFAULT,
            Self::Lzma => VERSION_NEEDED_LZMA,
        }
    }
}

impl TryFrom<u16> for CompressionMethod {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Store),
            14 => Ok(Self::Lzma),
            other => Err(other),
        }
    }
}

impl From<CompressionMethod> for u16 {
    fn from(method: CompressionMethod) -> u16 {
        method as u16
    }
}
