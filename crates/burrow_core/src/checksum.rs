//! CRC-32 (IEEE) checksums over record bytes.
//!
//! The stored checksum field itself is never part of the checksummed input:
//! callers pass the header or metadata bytes that follow it.

use crc32fast::Hasher;

/// Computes the CRC-32 of a byte slice.
#[must_use]
pub fn compute_crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Checksum of an entry: header fields after the crc, then key, then value.
#[must_use]
pub fn entry_checksum(header_fields: &[u8], key: &[u8], value: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(header_fields);
    hasher.update(key);
    hasher.update(value);
    hasher.finalize()
}

/// Checksum of a bucket record: metadata after the crc, then the payload.
#[must_use]
pub fn bucket_checksum(meta_fields: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(meta_fields);
    hasher.update(payload);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_known_value() {
        // Known test vector: "123456789" should give 0xCBF43926
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn crc32_empty() {
        assert_eq!(compute_crc32(b""), 0);
    }

    #[test]
    fn incremental_matches_contiguous() {
        assert_eq!(
            entry_checksum(b"1234", b"567", b"89"),
            compute_crc32(b"123456789")
        );
        assert_eq!(bucket_checksum(b"12345", b"6789"), compute_crc32(b"123456789"));
    }
}
