//! Serialization sinks.
//!
//! A save pass writes the whole archive in one forward append-only
//! sweep; the only position information it needs is "how many bytes have
//! been emitted so far", used for alignment and directory-offset
//! bookkeeping.

use std::fs::File;
use std::io::Write;

use crate::Result;

/// Destination for one forward serialization pass.
pub trait StreamSink {
    /// Append bytes at the current end.
    fn put(&mut self, bytes: &[u8]) -> Result<()>;

    /// Absolute write position (bytes emitted so far).
    fn tell(&self) -> u64;
}

/// Growable in-memory sink.
#[derive(Debug, Default)]
pub struct BufferSink {
    buf: Vec<u8>,
}

impl BufferSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink with a pre-sized buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// View the emitted bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the sink and return the emitted bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl StreamSink for BufferSink {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.buf.len() as u64
    }
}

/// File-handle sink.
///
/// Assumes the file's write position starts at the beginning; the
/// position is tracked locally so `tell` never needs a seek.
#[derive(Debug)]
pub struct FileSink {
    file: File,
    position: u64,
}

impl FileSink {
    /// Wrap a freshly-created file.
    pub fn new(file: File) -> Self {
        Self { file, position: 0 }
    }

    /// Flush and return the underlying file.
    pub fn into_inner(mut self) -> Result<File> {
        self.file.flush()?;
        Ok(self.file)
    }
}

impl StreamSink for FileSink {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.position
    }
}
