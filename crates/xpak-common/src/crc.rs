//! CRC-32 hashing utilities.
//!
//! Pak archives use the classic zlib CRC-32 (IEEE polynomial) for entry
//! checksums. The checksum is always taken over the uncompressed payload.

/// Compute the CRC-32 of a byte slice.
///
/// Uses hardware acceleration when available.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Continue a previous CRC-32 computation with more data.
#[inline]
pub fn hash_bytes_with_seed(data: &[u8], seed: u32) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(seed);
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hash() {
        assert_eq!(hash_bytes(&[]), 0);
    }

    #[test]
    fn test_check_value() {
        // The standard CRC-32 check value.
        assert_eq!(hash_bytes(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_seeded_continuation() {
        let whole = hash_bytes(b"hello world");
        let part = hash_bytes(b"hello ");
        assert_eq!(hash_bytes_with_seed(b"world", part), whole);
    }
}
