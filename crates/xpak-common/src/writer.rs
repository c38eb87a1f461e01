//! Append-only binary serialization with selectable byte order.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::Endian;

/// A growable binary writer.
///
/// The counterpart of [`BinaryReader`](crate::BinaryReader): integer
/// fields are encoded in the byte order selected at construction, and
/// writes only ever append. Record serializers build their fixed part in
/// one of these before handing the bytes to a sink.
#[derive(Debug, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
    endian: Endian,
}

impl BinaryWriter {
    /// Create an empty little-endian writer.
    #[inline]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            endian: Endian::Little,
        }
    }

    /// Create an empty writer with an explicit byte order.
    #[inline]
    pub const fn with_endian(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            endian,
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append raw bytes.
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte.
    #[inline]
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a u16 in the writer's byte order.
    #[inline]
    pub fn put_u16(&mut self, value: u16) {
        let mut tmp = [0u8; 2];
        match self.endian {
            Endian::Little => LittleEndian::write_u16(&mut tmp, value),
            Endian::Big => BigEndian::write_u16(&mut tmp, value),
        }
        self.buf.extend_from_slice(&tmp);
    }

    /// Append a u32 in the writer's byte order.
    #[inline]
    pub fn put_u32(&mut self, value: u32) {
        let mut tmp = [0u8; 4];
        match self.endian {
            Endian::Little => LittleEndian::write_u32(&mut tmp, value),
            Endian::Big => BigEndian::write_u32(&mut tmp, value),
        }
        self.buf.extend_from_slice(&tmp);
    }

    /// Append a u64 in the writer's byte order.
    #[inline]
    pub fn put_u64(&mut self, value: u64) {
        let mut tmp = [0u8; 8];
        match self.endian {
            Endian::Little => LittleEndian::write_u64(&mut tmp, value),
            Endian::Big => BigEndian::write_u64(&mut tmp, value),
        }
        self.buf.extend_from_slice(&tmp);
    }

    /// Append `count` zero bytes (alignment padding).
    #[inline]
    pub fn put_zeros(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    /// View the accumulated bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return the accumulated bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}
