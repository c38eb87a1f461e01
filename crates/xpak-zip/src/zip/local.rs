//! Local File Header structure.

use xpak_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// Local File Header.
///
/// Precedes each entry's payload in the archive. The extra field length
/// doubles as the alignment pad: it is chosen so the payload bytes start
/// on the container's alignment boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileHeader {
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose bit flag
    pub flags: u16,
    /// Compression method
    pub compression_method: u16,
    /// File last modification time (DOS format)
    pub mod_time: u16,
    /// File last modification date (DOS format)
    pub mod_date: u16,
    /// CRC-32 of uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub file_name_length: u16,
    /// Extra field length (alignment padding)
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// Local File Header signature as u32.
    pub const SIGNATURE: u32 = 0x04034b50;

    /// Fixed record size in bytes, signature included.
    pub const SIZE: usize = 30;

    /// Read and validate a header at the reader's position.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let block = reader
            .read_bytes(Self::SIZE)
            .map_err(|_| Error::TruncatedArchive("local file header"))?;
        let mut r = BinaryReader::with_endian(block, reader.endian());

        let signature = r.read_u32()?;
        if signature != Self::SIGNATURE {
            return Err(Error::BadSignature {
                expected: Self::SIGNATURE,
                actual: signature,
            });
        }

        Ok(Self {
            version_needed: r.read_u16()?,
            flags: r.read_u16()?,
            compression_method: r.read_u16()?,
            mod_time: r.read_u16()?,
            mod_date: r.read_u16()?,
            crc32: r.read_u32()?,
            compressed_size: r.read_u32()?,
            uncompressed_size: r.read_u32()?,
            file_name_length: r.read_u16()?,
            extra_field_length: r.read_u16()?,
        })
    }

    /// Serialize the header, signature included.
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.put_u32(Self::SIGNATURE);
        writer.put_u16(self.version_needed);
        writer.put_u16(self.flags);
        writer.put_u16(self.compression_method);
        writer.put_u16(self.mod_time);
        writer.put_u16(self.mod_date);
        writer.put_u32(self.crc32);
        writer.put_u32(self.compressed_size);
        writer.put_u32(self.uncompressed_size);
        writer.put_u16(self.file_name_length);
        writer.put_u16(self.extra_field_length);
    }

    /// Total variable-length data size following this header.
    pub fn variable_data_size(&self) -> usize {
        self.file_name_length as usize + self.extra_field_length as usize
    }
}
