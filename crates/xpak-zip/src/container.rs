//! The pak container: parse, build, and serialize ZIP-format archives.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use xpak_common::{crc, memchr::memmem, BinaryReader, BinaryWriter, Endian};

use crate::cache::DiskWriteCache;
use crate::codec;
use crate::entry::{EntryTable, NameCase, Payload, ZipEntry};
use crate::sink::{BufferSink, StreamSink};
use crate::text;
use crate::zip::{
    CentralDirectoryHeader, CompressionMethod, EocdRecord, LocalFileHeader, XzipComment,
    XZIP_COMMENT_LEN,
};
use crate::{Error, Result};

/// A directory record pulled out of an archive being mounted.
struct RawDirEntry {
    name: String,
    compressed_size: u32,
    uncompressed_size: u32,
    compression: CompressionMethod,
    crc32: u32,
    local_header_offset: u64,
}

/// Parsed end-of-central-directory information.
struct EocdInfo {
    entries_total: u16,
    central_dir_offset: u32,
    central_dir_size: u32,
    xzip: Option<XzipComment>,
}

/// Payload location snapshot, detached from the entry borrow.
enum PayloadSource {
    Memory(Vec<u8>),
    Cache(u64),
    Source(u64),
}

/// An embedded ZIP/PAK container.
///
/// Stores an arbitrary set of named byte blobs — the private
/// mini-filesystem embedded inside a level file. Entries are kept sorted
/// by name; serialization can pad every payload onto a power-of-two
/// boundary so the engine can map payload bytes directly without a copy.
///
/// One container is single-threaded: callers serialize access, and
/// independent containers share nothing.
///
/// # Example
///
/// ```
/// use xpak_zip::{CompressionMethod, NameCase, ZipContainer};
///
/// let mut pak = ZipContainer::new(NameCase::Insensitive);
/// pak.add_buffer("readme.txt", b"hello", false, CompressionMethod::Store)?;
/// let bytes = pak.save_to_buffer()?;
///
/// let mut mounted = ZipContainer::new(NameCase::Insensitive);
/// mounted.parse_from_buffer(&bytes)?;
/// assert_eq!(mounted.read("README.TXT", false)?, b"hello");
/// # Ok::<(), xpak_zip::Error>(())
/// ```
pub struct ZipContainer {
    entries: EntryTable,
    alignment: u32,
    compatible_format: bool,
    force_alignment: bool,
    endian: Endian,
    cache: Option<DiskWriteCache>,
    source: Option<File>,
}

impl ZipContainer {
    /// Create an empty container with the given name-comparison rule.
    pub fn new(case: NameCase) -> Self {
        Self {
            entries: EntryTable::new(case),
            alignment: 0,
            compatible_format: true,
            force_alignment: false,
            endian: Endian::Little,
            cache: None,
            source: None,
        }
    }

    /// Create an empty container that spills payloads to a temp file.
    ///
    /// The spill file is created in `cache_dir` or the default temp
    /// location; if creation fails, caching is silently disabled and
    /// payloads stay in memory.
    pub fn with_disk_cache(case: NameCase, cache_dir: Option<&Path>) -> Self {
        let mut container = Self::new(case);
        container.cache = DiskWriteCache::open(cache_dir).ok();
        container
    }

    /// Select the byte order for all on-disk integer fields.
    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.endian = if big_endian {
            Endian::Big
        } else {
            Endian::Little
        };
    }

    /// Override alignment and format compatibility for subsequent saves.
    ///
    /// While `enabled`, a mounted archive's XZIP comment no longer
    /// overrides these settings. A non-power-of-two `alignment` is
    /// treated as no alignment.
    pub fn force_alignment(&mut self, enabled: bool, compatible_format: bool, alignment: u32) {
        self.force_alignment = enabled;
        self.compatible_format = compatible_format;
        self.alignment = if alignment.is_power_of_two() {
            alignment
        } else {
            0
        };
    }

    /// Current alignment boundary (0 = unaligned).
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// Whether the central directory duplicates alignment padding.
    pub fn compatible_format(&self) -> bool {
        self.compatible_format
    }

    /// Number of live entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether an entry with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.entries.find(name).is_some()
    }

    /// Entry metadata by name.
    pub fn stat(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.find(name)
    }

    /// Iterate entry metadata in directory (name-sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &ZipEntry> {
        self.entries.iter()
    }

    /// Iterate entry names in directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Drop all entries and start over. Idempotent.
    ///
    /// Discards the spill file (replacing it with a fresh one) and
    /// releases any mounted source archive.
    pub fn reset(&mut self) -> Result<()> {
        self.entries.clear();
        self.source = None;
        if let Some(cache) = &mut self.cache {
            cache.reset()?;
        }
        Ok(())
    }

    /// Add or replace an entry from a byte buffer.
    ///
    /// In text mode the payload is stored with CRLF line endings (the
    /// inverse of what [`read`](Self::read) undoes). The CRC is computed
    /// over the post-transform, pre-compression bytes. Replacing an
    /// existing name is documented behavior, never an error.
    pub fn add_buffer(
        &mut self,
        name: &str,
        data: &[u8],
        text_mode: bool,
        method: CompressionMethod,
    ) -> Result<()> {
        let data = if text_mode {
            text::to_crlf(data)
        } else {
            data.to_vec()
        };
        let crc32 = crc::hash_bytes(&data);
        let uncompressed_size = data.len() as u32;

        // Empty payloads are dropped from the emitted archive anyway;
        // compressing one would only manufacture phantom bytes.
        let (encoded, method) = if data.is_empty() {
            (data, CompressionMethod::Store)
        } else {
            (codec::encode(method, &data)?, method)
        };
        let compressed_size = encoded.len() as u32;

        let payload = match &mut self.cache {
            Some(cache) => Payload::OnDiskCache {
                offset: cache.append(&encoded)?,
            },
            None => Payload::InMemory(encoded),
        };

        self.entries.insert(ZipEntry {
            name: name.to_string(),
            compressed_size,
            uncompressed_size,
            compression: method,
            crc32,
            payload,
            zip_offset: 0,
        });
        Ok(())
    }

    /// Add or replace an entry with the contents of a file.
    pub fn add_file(&mut self, name: &str, source_path: &Path, method: CompressionMethod) -> Result<()> {
        let data = std::fs::read(source_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::SourceFileNotFound(source_path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        self.add_buffer(name, &data, false, method)
    }

    /// Remove an entry; a missing name is not an error.
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Read an entry's payload, decompressing and CRC-checking it.
    ///
    /// In text mode CRLF sequences are collapsed back to LF.
    pub fn read(&mut self, name: &str, text_mode: bool) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

        let compressed_size = entry.compressed_size as usize;
        let uncompressed_size = entry.uncompressed_size as usize;
        let method = entry.compression;
        let stored_crc = entry.crc32;
        let source = match &entry.payload {
            Payload::InMemory(bytes) => PayloadSource::Memory(bytes.clone()),
            Payload::OnDiskCache { offset } => PayloadSource::Cache(*offset),
            Payload::OnDiskSource {
                local_header_offset,
            } => PayloadSource::Source(*local_header_offset),
        };

        let compressed = match source {
            PayloadSource::Memory(bytes) => bytes,
            PayloadSource::Cache(offset) => match &mut self.cache {
                Some(cache) => cache.read_at(offset, compressed_size)?,
                None => {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "entry payload recorded in a disk cache that no longer exists",
                    )))
                }
            },
            PayloadSource::Source(offset) => self.read_source_payload(offset, compressed_size)?,
        };

        let data = codec::decode(method, &compressed, uncompressed_size)?;
        let computed = crc::hash_bytes(&data);
        if computed != stored_crc {
            return Err(Error::ChecksumMismatch {
                stored: stored_crc,
                computed,
            });
        }

        Ok(if text_mode {
            text::from_crlf(&data)
        } else {
            data
        })
    }

    /// Fetch payload bytes lazily from the mounted archive file.
    fn read_source_payload(&mut self, local_header_offset: u64, len: usize) -> Result<Vec<u8>> {
        let file = self.source.as_mut().ok_or_else(|| {
            Error::SourceReadFailed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no mounted archive",
            ))
        })?;

        file.seek(SeekFrom::Start(local_header_offset))
            .map_err(Error::SourceReadFailed)?;
        let mut head = [0u8; LocalFileHeader::SIZE];
        file.read_exact(&mut head).map_err(Error::SourceReadFailed)?;

        let mut reader = BinaryReader::with_endian(&head, self.endian);
        let header = LocalFileHeader::read(&mut reader)?;

        file.seek(SeekFrom::Current(header.variable_data_size() as i64))
            .map_err(Error::SourceReadFailed)?;
        let mut payload = vec![0u8; len];
        file.read_exact(&mut payload)
            .map_err(Error::SourceReadFailed)?;
        Ok(payload)
    }

    /// Mount an archive from a fully-buffered blob, replacing all
    /// existing entries.
    ///
    /// Payload bytes are copied out of the buffer immediately. A buffer
    /// with no end-of-central-directory signature mounts as an empty
    /// container; a signature followed by a short or corrupt directory
    /// is an error, and the container is left empty in that case.
    pub fn parse_from_buffer(&mut self, data: &[u8]) -> Result<()> {
        self.reset()?;

        let Some(eocd_pos) = self.locate_eocd(data) else {
            return Ok(());
        };
        let info = self.read_eocd_at(data, eocd_pos)?;

        let cd_offset = info.central_dir_offset as usize;
        let cd_end = cd_offset
            .checked_add(info.central_dir_size as usize)
            .filter(|&end| end <= data.len())
            .ok_or(Error::TruncatedArchive("central directory"))?;
        let raw = self.read_central_dir(&data[cd_offset..cd_end], info.entries_total as usize)?;

        // Stage every payload before touching the table, so a corrupt
        // local header cannot leave a half-built directory behind.
        let mut staged = Vec::with_capacity(raw.len());
        for r in raw {
            let payload = Self::copy_local_payload(data, &r, self.endian)?;
            staged.push(ZipEntry {
                name: r.name,
                compressed_size: r.compressed_size,
                uncompressed_size: r.uncompressed_size,
                compression: r.compression,
                crc32: r.crc32,
                payload: Payload::InMemory(payload),
                zip_offset: r.local_header_offset,
            });
        }

        self.apply_xzip(info.xzip);
        for entry in staged {
            self.entries.insert(entry);
        }
        Ok(())
    }

    /// Mount an archive file by reading only its central directory,
    /// replacing all existing entries.
    ///
    /// The file handle stays owned by the container; payload bytes are
    /// streamed on demand by [`read`](Self::read).
    pub fn parse_from_disk(&mut self, path: &Path) -> Result<()> {
        self.reset()?;

        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::SourceFileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let file_len = file.metadata()?.len();

        // Tail window: the fixed record plus the largest possible comment.
        let window = file_len.min((EocdRecord::SIZE + u16::MAX as usize) as u64);
        let window_start = file_len - window;
        file.seek(SeekFrom::Start(window_start))?;
        let mut tail = vec![0u8; window as usize];
        file.read_exact(&mut tail)?;

        let Some(eocd_pos) = self.locate_eocd(&tail) else {
            self.source = Some(file);
            return Ok(());
        };
        let info = self.read_eocd_at(&tail, eocd_pos)?;

        let cd_size = info.central_dir_size as usize;
        let cd_end = (info.central_dir_offset as u64).checked_add(cd_size as u64);
        if cd_end.is_none() || cd_end.unwrap_or(u64::MAX) > file_len {
            return Err(Error::TruncatedArchive("central directory"));
        }
        file.seek(SeekFrom::Start(info.central_dir_offset as u64))?;
        let mut cd_bytes = vec![0u8; cd_size];
        file.read_exact(&mut cd_bytes)
            .map_err(|_| Error::TruncatedArchive("central directory"))?;

        let raw = self.read_central_dir(&cd_bytes, info.entries_total as usize)?;

        self.apply_xzip(info.xzip);
        for r in raw {
            self.entries.insert(ZipEntry {
                name: r.name,
                compressed_size: r.compressed_size,
                uncompressed_size: r.uncompressed_size,
                compression: r.compression,
                crc32: r.crc32,
                payload: Payload::OnDiskSource {
                    local_header_offset: r.local_header_offset,
                },
                zip_offset: r.local_header_offset,
            });
        }
        self.source = Some(file);
        Ok(())
    }

    /// Serialize into a freshly-allocated buffer.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        let mut sink = BufferSink::with_capacity(self.estimate_size() as usize);
        self.save_to_stream(&mut sink)?;
        Ok(sink.into_inner())
    }

    /// Serialize the archive in one forward pass.
    ///
    /// Walks entries in directory order writing local header + name +
    /// alignment padding + payload, then the central directory, then the
    /// end record with the XZIP comment. Fixes up each entry's
    /// `zip_offset`. Entries with a zero compressed size are silently
    /// skipped.
    pub fn save_to_stream<S: StreamSink>(&mut self, sink: &mut S) -> Result<()> {
        let endian = self.endian;
        let alignment = self.alignment;
        let compatible = self.compatible_format;

        // Local file headers and payloads.
        for index in 0..self.entries.len() {
            let Some((name_len, compressed_size)) =
                self.entries.get(index).map(|e| (e.name.len(), e.compressed_size))
            else {
                break;
            };
            if compressed_size == 0 {
                continue;
            }

            let payload = self.resolve_payload(index)?;
            let position = sink.tell();
            let extra = pad_for(
                position + LocalFileHeader::SIZE as u64 + name_len as u64,
                alignment,
            );

            let Some(entry) = self.entries.get_mut(index) else {
                break;
            };
            entry.zip_offset = position;

            let header = LocalFileHeader {
                version_needed: entry.compression.version_needed(),
                flags: 0,
                compression_method: entry.compression.into(),
                mod_time: 0,
                mod_date: 0,
                crc32: entry.crc32,
                compressed_size: entry.compressed_size,
                uncompressed_size: entry.uncompressed_size,
                file_name_length: name_len as u16,
                extra_field_length: extra as u16,
            };

            let mut w = BinaryWriter::with_endian(endian);
            header.write(&mut w);
            w.put_bytes(entry.name.as_bytes());
            w.put_zeros(extra as usize);
            sink.put(w.as_bytes())?;
            sink.put(&payload)?;
        }

        pad_sink(sink, alignment)?;
        let cd_offset = sink.tell();

        // Central directory.
        let mut emitted: u16 = 0;
        for entry in self.entries.iter() {
            if entry.compressed_size == 0 {
                continue;
            }
            let name_len = entry.name.len() as u64;
            // The same pad the local header received.
            let extra = pad_for(
                entry.zip_offset + LocalFileHeader::SIZE as u64 + name_len,
                alignment,
            );

            let header = CentralDirectoryHeader {
                version_made_by: 0,
                version_needed: entry.compression.version_needed(),
                flags: 0,
                compression_method: entry.compression.into(),
                mod_time: 0,
                mod_date: 0,
                crc32: entry.crc32,
                compressed_size: entry.compressed_size,
                uncompressed_size: entry.uncompressed_size,
                file_name_length: name_len as u16,
                extra_field_length: if compatible { extra as u16 } else { 0 },
                file_comment_length: 0,
                disk_number_start: 0,
                internal_attrs: 0,
                external_attrs: 0,
                local_header_offset: entry.zip_offset as u32,
            };

            let mut w = BinaryWriter::with_endian(endian);
            header.write(&mut w);
            w.put_bytes(entry.name.as_bytes());
            if compatible {
                w.put_zeros(extra as usize);
            }
            sink.put(w.as_bytes())?;
            emitted += 1;
        }

        let central_dir_size = sink.tell() - cd_offset;
        pad_sink(sink, alignment)?;

        // End record with the XZIP comment.
        let eocd = EocdRecord {
            disk_number: 0,
            central_dir_disk: 0,
            entries_this_disk: emitted,
            entries_total: emitted,
            central_dir_size: central_dir_size as u32,
            central_dir_offset: cd_offset as u32,
            comment_length: XZIP_COMMENT_LEN as u16,
        };
        let mut w = BinaryWriter::with_endian(endian);
        eocd.write(&mut w);
        sink.put(w.as_bytes())?;

        let comment = XzipComment {
            compatible_format: compatible,
            alignment,
        };
        sink.put(&comment.encode())?;
        Ok(())
    }

    /// Exact byte total a save would produce, without performing I/O.
    pub fn estimate_size(&self) -> u64 {
        let alignment = self.alignment;
        let mut position = 0u64;
        let mut directory = 0u64;

        for entry in self.entries.iter() {
            if entry.compressed_size == 0 {
                continue;
            }
            let name_len = entry.name.len() as u64;
            let extra = pad_for(position + LocalFileHeader::SIZE as u64 + name_len, alignment);
            position += LocalFileHeader::SIZE as u64
                + name_len
                + extra
                + entry.compressed_size as u64;
            directory += CentralDirectoryHeader::SIZE as u64
                + name_len
                + if self.compatible_format { extra } else { 0 };
        }

        position += pad_for(position, alignment);
        position += directory;
        position += pad_for(position, alignment);
        position + EocdRecord::SIZE as u64 + XZIP_COMMENT_LEN as u64
    }

    /// Backward scan for the end-of-central-directory signature.
    ///
    /// Walks strictly decreasing candidate offsets (rfind) with the loop
    /// bounded by the buffer start; no wraparound arithmetic.
    fn locate_eocd(&self, data: &[u8]) -> Option<usize> {
        memmem::rfind(data, &EocdRecord::magic(self.endian))
    }

    fn read_eocd_at(&self, data: &[u8], eocd_pos: usize) -> Result<EocdInfo> {
        let mut reader = BinaryReader::with_endian(&data[eocd_pos..], self.endian);
        let eocd = EocdRecord::read(&mut reader)?;
        let comment = reader
            .read_bytes(eocd.comment_length as usize)
            .map_err(|_| Error::TruncatedArchive("archive comment"))?;
        Ok(EocdInfo {
            entries_total: eocd.entries_total,
            central_dir_offset: eocd.central_dir_offset,
            central_dir_size: eocd.central_dir_size,
            xzip: XzipComment::parse(comment),
        })
    }

    fn read_central_dir(&self, cd: &[u8], count: usize) -> Result<Vec<RawDirEntry>> {
        let mut reader = BinaryReader::with_endian(cd, self.endian);
        let mut raw = Vec::with_capacity(count);

        for _ in 0..count {
            let header = CentralDirectoryHeader::read(&mut reader)?;
            let name = reader
                .read_string(header.file_name_length as usize)
                .map_err(|e| match e {
                    xpak_common::Error::UnexpectedEof { .. } => {
                        Error::TruncatedArchive("entry name")
                    }
                    other => Error::Common(other),
                })?;
            reader.advance(header.extra_field_length as usize + header.file_comment_length as usize);

            let compression = CompressionMethod::try_from(header.compression_method)
                .map_err(Error::UnsupportedCompressionMethod)?;

            raw.push(RawDirEntry {
                name: name.to_ascii_lowercase(),
                compressed_size: header.compressed_size,
                uncompressed_size: header.uncompressed_size,
                compression,
                crc32: header.crc32,
                local_header_offset: header.local_header_offset as u64,
            });
        }
        Ok(raw)
    }

    /// Adopt alignment settings from a mounted archive's XZIP comment,
    /// unless the caller has forced their own.
    fn apply_xzip(&mut self, xzip: Option<XzipComment>) {
        if self.force_alignment {
            return;
        }
        if let Some(comment) = xzip {
            self.compatible_format = comment.compatible_format;
            self.alignment = if comment.alignment.is_power_of_two() {
                comment.alignment
            } else {
                0
            };
        }
    }

    /// Copy an entry's compressed bytes out of a buffer-mounted archive.
    fn copy_local_payload(data: &[u8], raw: &RawDirEntry, endian: Endian) -> Result<Vec<u8>> {
        let offset = raw.local_header_offset as usize;
        if offset >= data.len() {
            return Err(Error::TruncatedArchive("local file header"));
        }
        let mut reader = BinaryReader::with_endian(&data[offset..], endian);
        let header = LocalFileHeader::read(&mut reader)?;
        reader.advance(header.variable_data_size());
        let payload = reader
            .read_bytes(raw.compressed_size as usize)
            .map_err(|_| Error::TruncatedArchive("entry payload"))?;
        Ok(payload.to_vec())
    }

    /// Fetch the (possibly compressed) payload bytes for a save pass.
    fn resolve_payload(&mut self, index: usize) -> Result<Vec<u8>> {
        let (source, compressed_size) = {
            let entry = self
                .entries
                .get(index)
                .ok_or_else(|| Error::EntryNotFound(format!("#{index}")))?;
            let source = match &entry.payload {
                Payload::InMemory(bytes) => PayloadSource::Memory(bytes.clone()),
                Payload::OnDiskCache { offset } => PayloadSource::Cache(*offset),
                Payload::OnDiskSource {
                    local_header_offset,
                } => PayloadSource::Source(*local_header_offset),
            };
            (source, entry.compressed_size as usize)
        };

        match source {
            PayloadSource::Memory(bytes) => Ok(bytes),
            PayloadSource::Cache(offset) => match &mut self.cache {
                Some(cache) => cache.read_at(offset, compressed_size),
                None => Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "entry payload recorded in a disk cache that no longer exists",
                ))),
            },
            PayloadSource::Source(offset) => self.read_source_payload(offset, compressed_size),
        }
    }
}

/// Padding needed to bring `position` up to the next multiple of `alignment`.
const fn pad_for(position: u64, alignment: u32) -> u64 {
    if alignment == 0 {
        return 0;
    }
    let alignment = alignment as u64;
    (alignment - (position % alignment)) % alignment
}

fn pad_sink<S: StreamSink>(sink: &mut S, alignment: u32) -> Result<()> {
    let pad = pad_for(sink.tell(), alignment) as usize;
    if pad > 0 {
        sink.put(&vec![0u8; pad])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligned_container(alignment: u32) -> ZipContainer {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.force_alignment(true, true, alignment);
        pak
    }

    /// Data start offset of every entry, recovered from the saved bytes.
    fn payload_offsets(saved: &[u8]) -> Vec<u64> {
        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_buffer(saved).unwrap();
        mounted
            .iter()
            .map(|e| {
                let off = e.zip_offset as usize;
                let mut reader = BinaryReader::new(&saved[off..]);
                let header = LocalFileHeader::read(&mut reader).unwrap();
                e.zip_offset
                    + LocalFileHeader::SIZE as u64
                    + header.file_name_length as u64
                    + header.extra_field_length as u64
            })
            .collect()
    }

    #[test]
    fn test_roundtrip_stored_and_lzma() {
        let mut pak = aligned_container(512);
        pak.add_buffer("a.txt", b"hello", false, CompressionMethod::Store)
            .unwrap();
        pak.add_buffer("b.bin", &vec![0u8; 10_000], false, CompressionMethod::Lzma)
            .unwrap();

        let saved = pak.save_to_buffer().unwrap();
        assert_eq!(pak.estimate_size(), saved.len() as u64);

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_buffer(&saved).unwrap();
        assert_eq!(mounted.entry_count(), 2);
        assert_eq!(mounted.alignment(), 512);

        assert_eq!(mounted.read("a.txt", false).unwrap(), b"hello");
        assert_eq!(mounted.read("b.bin", false).unwrap(), vec![0u8; 10_000]);

        let a = mounted.stat("a.txt").unwrap();
        assert_eq!(a.uncompressed_size, 5);
        assert_eq!(a.crc32, crc::hash_bytes(b"hello"));
        let b = mounted.stat("b.bin").unwrap();
        assert_eq!(b.uncompressed_size, 10_000);
        assert_eq!(b.compression, CompressionMethod::Lzma);
        assert!(b.compressed_size < b.uncompressed_size);
    }

    #[test]
    fn test_alignment_invariant() {
        for alignment in [2u32, 16, 512, 4096] {
            let mut pak = aligned_container(alignment);
            pak.add_buffer("one.bin", &[1u8; 37], false, CompressionMethod::Store)
                .unwrap();
            pak.add_buffer("two.bin", &[2u8; 1000], false, CompressionMethod::Store)
                .unwrap();
            pak.add_buffer("three.bin", &[3u8; 5], false, CompressionMethod::Store)
                .unwrap();

            let saved = pak.save_to_buffer().unwrap();
            for offset in payload_offsets(&saved) {
                assert_eq!(offset % alignment as u64, 0, "alignment {alignment}");
            }
        }
    }

    #[test]
    fn test_dense_format_roundtrip() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.force_alignment(true, false, 64);
        pak.add_buffer("x.bin", &[7u8; 100], false, CompressionMethod::Store)
            .unwrap();

        let saved = pak.save_to_buffer().unwrap();
        assert_eq!(pak.estimate_size(), saved.len() as u64);

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_buffer(&saved).unwrap();
        assert!(!mounted.compatible_format());
        assert_eq!(mounted.alignment(), 64);
        assert_eq!(mounted.read("x.bin", false).unwrap(), [7u8; 100]);
    }

    #[test]
    fn test_case_normalization_and_overwrite() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.add_buffer("Foo.TXT", b"first", false, CompressionMethod::Store)
            .unwrap();
        assert!(pak.exists("foo.txt"));

        pak.add_buffer("FOO.txt", b"second", false, CompressionMethod::Store)
            .unwrap();
        assert_eq!(pak.entry_count(), 1);
        assert_eq!(pak.read("foo.txt", false).unwrap(), b"second");

        // Names are stored lower-cased in the archive itself.
        let saved = pak.save_to_buffer().unwrap();
        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_buffer(&saved).unwrap();
        assert_eq!(mounted.names().collect::<Vec<_>>(), ["foo.txt"]);
    }

    #[test]
    fn test_zero_length_entry_dropped_from_archive() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.add_buffer("empty.dat", b"", false, CompressionMethod::Lzma)
            .unwrap();
        assert!(pak.exists("empty.dat"));

        let saved = pak.save_to_buffer().unwrap();
        assert_eq!(pak.estimate_size(), saved.len() as u64);
        // Just the empty directory, end record, and comment.
        assert_eq!(
            saved.len(),
            EocdRecord::SIZE + XZIP_COMMENT_LEN
        );

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_buffer(&saved).unwrap();
        assert_eq!(mounted.entry_count(), 0);
    }

    #[test]
    fn test_text_mode_roundtrip() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.add_buffer("notes.txt", b"a\nb\n", true, CompressionMethod::Store)
            .unwrap();

        let saved = pak.save_to_buffer().unwrap();
        // The raw archive bytes hold the CRLF form.
        assert!(saved.windows(6).any(|w| w == b"a\r\nb\r\n"));

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_buffer(&saved).unwrap();
        assert_eq!(mounted.read("notes.txt", true).unwrap(), b"a\nb\n");
        assert_eq!(mounted.read("notes.txt", false).unwrap(), b"a\r\nb\r\n");
    }

    #[test]
    fn test_save_is_idempotent() {
        let mut pak = aligned_container(16);
        pak.add_buffer("f.bin", &[9u8; 50], false, CompressionMethod::Store)
            .unwrap();

        let first = pak.save_to_buffer().unwrap();
        let second = pak.save_to_buffer().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut pak = ZipContainer::with_disk_cache(NameCase::Insensitive, None);
        pak.add_buffer("f.bin", &[9u8; 50], false, CompressionMethod::Store)
            .unwrap();

        pak.reset().unwrap();
        pak.reset().unwrap();
        assert_eq!(pak.entry_count(), 0);
    }

    #[test]
    fn test_disk_cache_spill_and_read() {
        let mut pak = ZipContainer::with_disk_cache(NameCase::Insensitive, None);
        pak.force_alignment(true, true, 32);
        pak.add_buffer("spilled.bin", &[5u8; 4000], false, CompressionMethod::Store)
            .unwrap();
        pak.add_buffer("packed.bin", &[6u8; 4000], false, CompressionMethod::Lzma)
            .unwrap();

        // Reads come back through the cache before any save.
        assert_eq!(pak.read("spilled.bin", false).unwrap(), [5u8; 4000]);
        assert_eq!(pak.read("packed.bin", false).unwrap(), [6u8; 4000]);

        let saved = pak.save_to_buffer().unwrap();
        assert_eq!(pak.estimate_size(), saved.len() as u64);

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_buffer(&saved).unwrap();
        assert_eq!(mounted.read("spilled.bin", false).unwrap(), [5u8; 4000]);
    }

    #[test]
    fn test_parse_from_disk_streams_lazily() {
        let mut pak = aligned_container(128);
        pak.add_buffer("deep/file.txt", b"lazy bytes", false, CompressionMethod::Store)
            .unwrap();
        pak.add_buffer("z.bin", &vec![1u8; 2000], false, CompressionMethod::Lzma)
            .unwrap();
        let saved = pak.save_to_buffer().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.pak");
        std::fs::write(&path, &saved).unwrap();

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.parse_from_disk(&path).unwrap();
        assert_eq!(mounted.entry_count(), 2);
        assert!(matches!(
            mounted.stat("deep/file.txt").unwrap().payload,
            Payload::OnDiskSource { .. }
        ));

        assert_eq!(mounted.read("deep/file.txt", false).unwrap(), b"lazy bytes");
        assert_eq!(mounted.read("z.bin", false).unwrap(), vec![1u8; 2000]);

        // A disk-mounted container can be re-serialized.
        let resaved = mounted.save_to_buffer().unwrap();
        let mut remounted = ZipContainer::new(NameCase::Insensitive);
        remounted.parse_from_buffer(&resaved).unwrap();
        assert_eq!(remounted.read("z.bin", false).unwrap(), vec![1u8; 2000]);
    }

    #[test]
    fn test_parse_missing_file() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        let result = pak.parse_from_disk(Path::new("/nonexistent/level.pak"));
        assert!(matches!(result, Err(Error::SourceFileNotFound(_))));
    }

    #[test]
    fn test_truncated_archive_fails_cleanly() {
        let mut pak = aligned_container(512);
        pak.add_buffer("a.txt", b"hello", false, CompressionMethod::Store)
            .unwrap();
        pak.add_buffer("b.bin", &vec![0u8; 10_000], false, CompressionMethod::Lzma)
            .unwrap();
        let saved = pak.save_to_buffer().unwrap();

        let truncated = &saved[..saved.len() - 4];
        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        let result = mounted.parse_from_buffer(truncated);
        assert!(matches!(
            result,
            Err(Error::TruncatedArchive(_)) | Err(Error::BadSignature { .. })
        ));
        // Never a partially-populated table.
        assert_eq!(mounted.entry_count(), 0);
    }

    #[test]
    fn test_buffer_without_signature_mounts_empty() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.parse_from_buffer(b"not a zip archive at all").unwrap();
        assert_eq!(pak.entry_count(), 0);
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.add_buffer("keep.txt", b"x", false, CompressionMethod::Store)
            .unwrap();
        pak.remove("missing.txt");
        pak.remove("keep.txt");
        pak.remove("keep.txt");
        assert_eq!(pak.entry_count(), 0);
    }

    #[test]
    fn test_read_missing_entry() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        assert!(matches!(
            pak.read("ghost.txt", false),
            Err(Error::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_non_power_of_two_alignment_disabled() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.force_alignment(true, true, 300);
        assert_eq!(pak.alignment(), 0);
    }

    #[test]
    fn test_forced_alignment_survives_mount() {
        let mut writer = aligned_container(512);
        writer
            .add_buffer("a.bin", &[1u8; 10], false, CompressionMethod::Store)
            .unwrap();
        let saved = writer.save_to_buffer().unwrap();

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.force_alignment(true, true, 64);
        mounted.parse_from_buffer(&saved).unwrap();
        // The archive says 512, but the caller forced 64.
        assert_eq!(mounted.alignment(), 64);
    }

    #[test]
    fn test_big_endian_roundtrip() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.set_big_endian(true);
        pak.force_alignment(true, true, 256);
        pak.add_buffer("console.bin", &[3u8; 123], false, CompressionMethod::Store)
            .unwrap();

        let saved = pak.save_to_buffer().unwrap();
        assert_eq!(pak.estimate_size(), saved.len() as u64);

        // A little-endian mount sees no valid signature.
        let mut wrong = ZipContainer::new(NameCase::Insensitive);
        wrong.parse_from_buffer(&saved).unwrap();
        assert_eq!(wrong.entry_count(), 0);

        let mut mounted = ZipContainer::new(NameCase::Insensitive);
        mounted.set_big_endian(true);
        mounted.parse_from_buffer(&saved).unwrap();
        assert_eq!(mounted.read("console.bin", false).unwrap(), [3u8; 123]);
    }

    #[test]
    fn test_estimate_matches_unaligned_save() {
        let mut pak = ZipContainer::new(NameCase::Insensitive);
        pak.add_buffer("a.txt", b"alpha", false, CompressionMethod::Store)
            .unwrap();
        pak.add_buffer("b.txt", b"beta", false, CompressionMethod::Store)
            .unwrap();
        pak.add_buffer("empty.txt", b"", false, CompressionMethod::Store)
            .unwrap();

        let saved = pak.save_to_buffer().unwrap();
        assert_eq!(pak.estimate_size(), saved.len() as u64);
    }
}
