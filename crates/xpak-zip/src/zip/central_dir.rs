//! Central Directory Header structure.

use xpak_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// Central Directory File Header.
///
/// One per entry, written after all payloads. In compatible-format
/// archives the extra field length (and the padding bytes themselves)
/// mirror the local header's alignment pad so stock unzip tools that
/// trust the central directory skip the right number of bytes; in the
/// dense engine-only format both are omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    /// Version made by
    pub version_made_by: u16,
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
    /// Extra field length
    pub extra_field_length: u16,
    /// File comment length
    pub file_comment_length: u16,
    /// Disk number where file starts
    pub disk_number_start: u16,
    /// Internal file attributes
    pub internal_attrs: u16,
    /// External file attributes
    pub external_attrs: u32,
    /// Relative offset of local file header
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    /// Central Directory signature as u32.
    pub const SIGNATURE: u32 = 0x02014b50;

    /// Fixed record size in bytes, signature included.
    pub const SIZE: usize = 46;

    /// Read and validate a header at the reader's position.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let block = reader
            .read_bytes(Self::SIZE)
            .map_err(|_| Error::TruncatedArchive("central directory header"))?;
        let mut r = BinaryReader::with_endian(block, reader.endian());

        let signature = r.read_u32()?;
        if signature != Self::SIGNATURE {
            return Err(Error::BadSignature {
                expected: Self::SIGNATURE,
                actual: signature,
            });
        }

        Ok(Self {
            version_made_by: r.read_u16()?,
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
            file_comment_length: r.read_u16()?,
            disk_number_start: r.read_u16()?,
            internal_attrs: r.read_u16()?,
            external_attrs: r.read_u32()?,
            local_header_offset: r.read_u32()?,
        })
    }

    /// Serialize the header, signature included.
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.put_u32(Self::SIGNATURE);
        writer.put_u16(self.version_made_by);
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
        writer.put_u16(self.file_comment_length);
        writer.put_u16(self.disk_number_start);
        writer.put_u16(self.internal_attrs);
        writer.put_u32(self.external_attrs);
        writer.put_u32(self.local_header_offset);
    }

    /// Total variable-length data size following this header.
    pub fn variable_data_size(&self) -> usize {
        self.file_name_length as usize
            + self.extra_field_length as usize
            + self.file_comment_length as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let header = CentralDirectoryHeader {
            version_made_by: 0,
            version_needed: 63,
            flags: 0,
            compression_method: 14,
            mod_time: 0,
            mod_date: 0,
            crc32: 0x12345678,
            compressed_size: 100,
            uncompressed_size: 10_000,
            file_name_length: 5,
            extra_field_length: 0,
            file_comment_length: 0,
            disk_number_start: 0,
            internal_attrs: 0,
            external_attrs: 0,
            local_header_offset: 512,
        };

        let mut w = BinaryWriter::new();
        header.write(&mut w);
        assert_eq!(w.len(), CentralDirectoryHeader::SIZE);

        let bytes = w.into_inner();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(CentralDirectoryHeader::read(&mut r).unwrap(), header);
    }

    #[test]
    fn test_wrong_record_kind() {
        // A local header signature where a directory record is expected.
        let bytes = [
            0x50, 0x4b, 0x03, 0x04, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let mut r = BinaryReader::new(&bytes);
        assert!(matches!(
            CentralDirectoryHeader::read(&mut r),
            Err(Error::BadSignature { .. })
        ));
    }
}
