//! Compression codec for stored and LZMA entries.
//!
//! LZMA entries use the ZIP vendor framing (spec §5.8.8): a 2-byte
//! version, a little-endian u16 properties length, the raw properties,
//! then the LZMA stream with no embedded unpacked size. The framing is
//! payload, not a record, so it stays little-endian even in byte-swapped
//! archives.

use crate::zip::CompressionMethod;
use crate::{Error, Result};

/// LZMA properties blob length (lc/lp/pb byte + dictionary size).
pub const LZMA_PROPS_SIZE: usize = 5;

/// Framing bytes preceding the properties: version major/minor + props length.
pub const LZMA_FRAME_HEADER_SIZE: usize = 4;

const LZMA_VERSION_MAJOR: u8 = 9;
const LZMA_VERSION_MINOR: u8 = 20;

/// Whether this build can produce entries compressed with `method`.
///
/// Decoding is always available; encoding LZMA requires the
/// `lzma-encode` feature.
pub fn can_encode(method: CompressionMethod) -> bool {
    match method {
        CompressionMethod::Store => true,
        CompressionMethod::Lzma => cfg!(feature = "lzma-encode"),
    }
}

/// Compress `data` with `method`, framing the output for storage.
pub fn encode(method: CompressionMethod, data: &[u8]) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::Store => Ok(data.to_vec()),
        CompressionMethod::Lzma => encode_lzma(data),
    }
}

#[cfg(feature = "lzma-encode")]
fn encode_lzma(data: &[u8]) -> Result<Vec<u8>> {
    use lzma_rs::compress::{Options, UnpackedSize};

    let options = Options {
        unpacked_size: UnpackedSize::SkipWritingToHeader,
    };

    let mut raw = Vec::new();
    lzma_rs::lzma_compress_with_options(&mut &data[..], &mut raw, &options)
        .map_err(|e| Error::CompressionFailed(e.to_string()))?;
    if raw.len() < LZMA_PROPS_SIZE {
        return Err(Error::CompressionFailed(
            "compressor produced no usable output".to_string(),
        ));
    }

    // Re-frame: the compressor's output starts with the 5 properties
    // bytes, which the ZIP layout wants behind an explicit length.
    let mut framed = Vec::with_capacity(LZMA_FRAME_HEADER_SIZE + raw.len());
    framed.push(LZMA_VERSION_MAJOR);
    framed.push(LZMA_VERSION_MINOR);
    framed.extend_from_slice(&(LZMA_PROPS_SIZE as u16).to_le_bytes());
    framed.extend_from_slice(&raw);
    Ok(framed)
}

#[cfg(not(feature = "lzma-encode"))]
fn encode_lzma(_data: &[u8]) -> Result<Vec<u8>> {
    Err(Error::CompressionUnavailable)
}

/// Decompress `data`, validating against the recorded uncompressed length.
pub fn decode(method: CompressionMethod, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::Store => {
            if data.len() != expected_len {
                return Err(Error::DecompressionMismatch {
                    expected: expected_len as u64,
                    actual: data.len() as u64,
                });
            }
            Ok(data.to_vec())
        }
        CompressionMethod::Lzma => decode_lzma(data, expected_len),
    }
}

fn decode_lzma(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    use lzma_rs::decompress::{Options, UnpackedSize};

    if data.len() < LZMA_FRAME_HEADER_SIZE {
        return Err(Error::Decompression("LZMA frame header truncated".to_string()));
    }
    let props_len = u16::from_le_bytes([data[2], data[3]]) as usize;
    if props_len != LZMA_PROPS_SIZE {
        return Err(Error::Decompression(format!(
            "unsupported LZMA properties length: {props_len}"
        )));
    }
    if data.len() < LZMA_FRAME_HEADER_SIZE + props_len {
        return Err(Error::Decompression("LZMA properties truncated".to_string()));
    }

    let options = Options {
        unpacked_size: UnpackedSize::UseProvided(Some(expected_len as u64)),
        memlimit: None,
        allow_incomplete: false,
    };

    let mut stream = &data[LZMA_FRAME_HEADER_SIZE..];
    let mut out = Vec::with_capacity(expected_len);
    lzma_rs::lzma_decompress_with_options(&mut stream, &mut out, &options)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    // The recorded compressed size must account for every byte; trailing
    // bytes the decoder never consumed mean the size field is corrupt.
    if !stream.is_empty() {
        return Err(Error::DecompressionMismatch {
            expected: data.len() as u64,
            actual: (data.len() - stream.len()) as u64,
        });
    }
    if out.len() != expected_len {
        return Err(Error::DecompressionMismatch {
            expected: expected_len as u64,
            actual: out.len() as u64,
        });
    }
    Ok(out)
}
