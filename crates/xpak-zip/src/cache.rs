//! Disk-backed write cache for archive building.
//!
//! While an archive is being assembled, payload bytes can be spilled to a
//! uniquely-named temp file instead of staying resident in memory until
//! the final save pass. The temp file is deleted on reset and on drop,
//! on every exit path.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::Result;

const CACHE_PREFIX: &str = "xpakcache";

/// Spill store for payload bytes during archive building.
#[derive(Debug)]
pub struct DiskWriteCache {
    file: NamedTempFile,
    dir: Option<PathBuf>,
    length: u64,
    dirty: bool,
}

impl DiskWriteCache {
    /// Create the spill file in `dir`, or in the default temp location.
    ///
    /// Callers treat a creation failure as "caching disabled" and keep
    /// payloads in memory instead.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        let file = Self::create_file(dir)?;
        Ok(Self {
            file,
            dir: dir.map(Path::to_path_buf),
            length: 0,
            dirty: false,
        })
    }

    fn create_file(dir: Option<&Path>) -> Result<NamedTempFile> {
        let file = match dir {
            Some(dir) => NamedTempFile::with_prefix_in(CACHE_PREFIX, dir)?,
            None => NamedTempFile::with_prefix(CACHE_PREFIX)?,
        };
        Ok(file)
    }

    /// Bytes currently stored.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Whether nothing has been spilled yet.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Append bytes at the current end, returning their offset.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let offset = self.length;
        let file = self.file.as_file_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        self.length += bytes.len() as u64;
        self.dirty = true;
        Ok(offset)
    }

    /// Read back bytes previously returned by [`append`](Self::append).
    ///
    /// Pending writes are flushed first; the offset is only trusted for
    /// data this cache wrote itself.
    pub fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let file = self.file.as_file_mut();
        if self.dirty {
            file.flush()?;
            self.dirty = false;
        }
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Delete the current spill file and start over with a fresh one.
    pub fn reset(&mut self) -> Result<()> {
        let fresh = Self::create_file(self.dir.as_deref())?;
        // Dropping the old NamedTempFile unlinks it.
        self.file = fresh;
        self.length = 0;
        self.dirty = false;
        Ok(())
    }
}
