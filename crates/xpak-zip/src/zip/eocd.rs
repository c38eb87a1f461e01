//! End of Central Directory record and the XZIP comment extension.

use std::io::Write;

use xpak_common::{BinaryReader, BinaryWriter, Endian};

use crate::{Error, Result};

/// End of Central Directory Record.
///
/// Located by scanning backward from the end of the archive. Multi-disk
/// fields are always zero in pak archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EocdRecord {
    /// Number of this disk
    pub disk_number: u16,
    /// Disk where central directory starts
    pub central_dir_disk: u16,
    /// Number of central directory records on this disk
    pub entries_this_disk: u16,
    /// Total number of central directory records
    pub entries_total: u16,
    /// Size of central directory (bytes)
    pub central_dir_size: u32,
    /// Offset of start of central directory
    pub central_dir_offset: u32,
    /// Comment length
    pub comment_length: u16,
}

impl EocdRecord {
    /// EOCD signature as u32.
    pub const SIGNATURE: u32 = 0x06054b50;

    /// Fixed record size in bytes, signature included.
    pub const SIZE: usize = 22;

    /// The signature's on-disk byte sequence in the given byte order.
    pub const fn magic(endian: Endian) -> [u8; 4] {
        match endian {
            Endian::Little => [0x50, 0x4b, 0x05, 0x06],
            Endian::Big => [0x06, 0x05, 0x4b, 0x50],
        }
    }

    /// Read and validate a record at the reader's position.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let block = reader
            .read_bytes(Self::SIZE)
            .map_err(|_| Error::TruncatedArchive("end of central directory record"))?;
        let mut r = BinaryReader::with_endian(block, reader.endian());

        let signature = r.read_u32()?;
        if signature != Self::SIGNATURE {
            return Err(Error::BadSignature {
                expected: Self::SIGNATURE,
                actual: signature,
            });
        }

        Ok(Self {
            disk_number: r.read_u16()?,
            central_dir_disk: r.read_u16()?,
            entries_this_disk: r.read_u16()?,
            entries_total: r.read_u16()?,
            central_dir_size: r.read_u32()?,
            central_dir_offset: r.read_u32()?,
            comment_length: r.read_u16()?,
        })
    }

    /// Serialize the record, signature included.
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.put_u32(Self::SIGNATURE);
        writer.put_u16(self.disk_number);
        writer.put_u16(self.central_dir_disk);
        writer.put_u16(self.entries_this_disk);
        writer.put_u16(self.entries_total);
        writer.put_u32(self.central_dir_size);
        writer.put_u32(self.central_dir_offset);
        writer.put_u16(self.comment_length);
    }
}

/// Fixed length of the XZIP archive comment.
pub const XZIP_COMMENT_LEN: usize = 32;

/// The vendor comment recording alignment and format-compatibility flags.
///
/// Written into the EOCD comment field as `"XZP" <'1'|'2'> ' ' <alignment>`
/// padded with NULs to 32 bytes. Version `'1'` means the central
/// directory duplicates the alignment padding (stock unzip tools work);
/// `'2'` is the dense engine-only form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XzipComment {
    /// Whether the central directory carries the padding too.
    pub compatible_format: bool,
    /// Alignment boundary in bytes, 0 for unaligned.
    pub alignment: u32,
}

impl XzipComment {
    /// Encode into the fixed 32-byte ASCII comment.
    pub fn encode(&self) -> [u8; XZIP_COMMENT_LEN] {
        let mut buf = [0u8; XZIP_COMMENT_LEN];
        let version = if self.compatible_format { '1' } else { '2' };
        let mut cursor = &mut buf[..];
        // The tag plus a u32 in decimal always fits in 32 bytes.
        let _ = write!(cursor, "XZP{} {}", version, self.alignment);
        buf
    }

    /// Parse a comment, returning `None` when it is not an XZIP tag.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 5 || !bytes.starts_with(b"XZP") {
            return None;
        }
        let compatible_format = match bytes[3] {
            b'1' => true,
            b'2' => false,
            _ => return None,
        };
        if bytes[4] != b' ' {
            return None;
        }

        let mut alignment: u32 = 0;
        for &b in &bytes[5..] {
            if !b.is_ascii_digit() {
                break;
            }
            alignment = alignment.checked_mul(10)?.checked_add((b - b'0') as u32)?;
        }
        Some(Self {
            compatible_format,
            alignment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let record = EocdRecord {
            disk_number: 0,
            central_dir_disk: 0,
            entries_this_disk: 2,
            entries_total: 2,
            central_dir_size: 124,
            central_dir_offset: 11_264,
            comment_length: XZIP_COMMENT_LEN as u16,
        };

        let mut w = BinaryWriter::new();
        record.write(&mut w);
        assert_eq!(w.len(), EocdRecord::SIZE);

        let bytes = w.into_inner();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(EocdRecord::read(&mut r).unwrap(), record);
    }

    #[test]
    fn test_comment_roundtrip() {
        let comment = XzipComment {
            compatible_format: true,
            alignment: 512,
        };
        let encoded = comment.encode();
        assert_eq!(&encoded[..8], b"XZP1 512");
        assert_eq!(XzipComment::parse(&encoded), Some(comment));

        let dense = XzipComment {
            compatible_format: false,
            alignment: 0,
        };
        assert_eq!(XzipComment::parse(&dense.encode()), Some(dense));
    }

    #[test]
    fn test_comment_rejects_foreign_text() {
        assert_eq!(XzipComment::parse(b"made by some other tool"), None);
        assert_eq!(XzipComment::parse(b"XZP9 16"), None);
        assert_eq!(XzipComment::parse(b""), None);
    }

    #[test]
    fn test_magic_byte_orders() {
        assert_eq!(EocdRecord::magic(Endian::Little), *b"PK\x05\x06");
        assert_eq!(EocdRecord::magic(Endian::Big), [0x06, 0x05, 0x4b, 0x50]);
    }
}
