//! Benchmark utilities.

#![warn(missing_docs)]

use burrow_core::{Bucket, BucketId, BucketOperation, DataStructure, Entry, EntryMeta};
use std::path::PathBuf;
use tempfile::TempDir;

/// Generate deterministic data of the specified size.
pub fn pattern_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Encoded log of `count` entries with `value_size`-byte values.
///
/// Returns the bytes and the offset of each entry.
pub fn encoded_log(count: usize, value_size: usize) -> (Vec<u8>, Vec<u64>) {
    let value = pattern_data(value_size);
    let mut data = Vec::new();
    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        offsets.push(data.len() as u64);
        let meta = EntryMeta::new()
            .with_timestamp(1_700_000_000 + i as u64)
            .with_bucket_id(BucketId::new(1));
        let entry = Entry::new(format!("key-{i:08}"), value.clone(), meta)
            .expect("Failed to build entry");
        data.extend_from_slice(&entry.encode());
    }
    (data, offsets)
}

/// Encoded catalog of `count` bucket inserts.
pub fn encoded_catalog(count: usize) -> Vec<u8> {
    (0..count as u64)
        .flat_map(|id| {
            Bucket::new(
                BucketOperation::Insert,
                BucketId::new(id),
                DataStructure::BTree,
                format!("bucket_{id}"),
            )
            .encode()
            .expect("Failed to encode bucket")
        })
        .collect()
}

/// Writes `data` to a file in a new temporary directory.
pub fn write_temp(data: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("bench.dat");
    std::fs::write(&path, data).expect("Failed to write bench file");
    (temp_dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::format::MAX_ENTRY_HEADER_SIZE;

    fn entry_len(value_size: usize) -> usize {
        let (data, offsets) = encoded_log(2, value_size);
        assert_eq!(data.len(), 2 * offsets[1] as usize);
        offsets[1] as usize
    }

    #[test]
    fn small_scan_sizes_fit_in_first_read() {
        assert!(entry_len(8) <= MAX_ENTRY_HEADER_SIZE);
        assert!(entry_len(16) <= MAX_ENTRY_HEADER_SIZE);
    }

    #[test]
    fn large_scan_sizes_need_second_read() {
        assert!(entry_len(32) > MAX_ENTRY_HEADER_SIZE);
        assert!(entry_len(256) > MAX_ENTRY_HEADER_SIZE);
        assert!(entry_len(4096) > MAX_ENTRY_HEADER_SIZE);
    }
}
