//! Test fixtures: data files and bucket catalogs on disk.
//!
//! Builders collect encoded records in memory and write them to a file in
//! a fresh temporary directory. The returned [`TestFile`] keeps the
//! directory alive and remembers what was written, so tests can compare
//! recovered records against the originals.

use burrow_core::{
    Bucket, BucketId, BucketOperation, DataStructure, Entry, EntryMeta, RecoveryReader,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Bucket id used by [`LogFileBuilder::put`].
pub const DEFAULT_BUCKET: BucketId = BucketId::new(1);

/// A file written by a builder, with automatic cleanup.
pub struct TestFile {
    path: PathBuf,
    entries: Vec<(u64, Entry)>,
    buckets: Vec<(u64, Bucket)>,
    valid_len: u64,
    _temp_dir: TempDir,
}

impl TestFile {
    /// Returns the path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries written, with their offsets. Torn entries are not included.
    pub fn entries(&self) -> &[(u64, Entry)] {
        &self.entries
    }

    /// Bucket records written, with their offsets.
    pub fn buckets(&self) -> &[(u64, Bucket)] {
        &self.buckets
    }

    /// Offset just past the last complete record.
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }

    /// Opens the file for recovery with a 4 KiB buffer.
    pub fn open(&self) -> RecoveryReader {
        self.open_with_buffer(4096)
    }

    /// Opens the file for recovery with the given buffer size hint.
    pub fn open_with_buffer(&self, buffer_size: usize) -> RecoveryReader {
        RecoveryReader::open(&self.path, buffer_size).expect("Failed to open test file")
    }

    /// Returns the current file contents.
    pub fn bytes(&self) -> Vec<u8> {
        fs::read(&self.path).expect("Failed to read test file")
    }

    /// Flips one bit of the byte at `offset`.
    pub fn flip_bit(&self, offset: u64, bit: u8) {
        let mut data = self.bytes();
        data[offset as usize] ^= 1 << bit;
        fs::write(&self.path, data).expect("Failed to write test file");
    }

    /// Overwrites bytes starting at `offset`.
    pub fn overwrite(&self, offset: u64, bytes: &[u8]) {
        let mut data = self.bytes();
        let start = offset as usize;
        data[start..start + bytes.len()].copy_from_slice(bytes);
        fs::write(&self.path, data).expect("Failed to write test file");
    }

    /// Cuts the file to `len` bytes, as a crash mid-write would.
    pub fn truncate(&self, len: u64) {
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .expect("Failed to open test file");
        file.set_len(len).expect("Failed to truncate test file");
    }
}

fn write_temp(name: &str, data: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join(name);
    fs::write(&path, data).expect("Failed to write test file");
    (temp_dir, path)
}

/// Builds a data file of entries.
#[derive(Default)]
pub struct LogFileBuilder {
    data: Vec<u8>,
    entries: Vec<(u64, Entry)>,
    valid_len: u64,
}

impl LogFileBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn entry(mut self, entry: Entry) -> Self {
        let offset = self.data.len() as u64;
        self.data.extend_from_slice(&entry.encode());
        self.valid_len = self.data.len() as u64;
        self.entries.push((offset, entry));
        self
    }

    /// Appends several entries.
    pub fn entries(self, entries: impl IntoIterator<Item = Entry>) -> Self {
        entries.into_iter().fold(self, Self::entry)
    }

    /// Appends a committed `Set` in [`DEFAULT_BUCKET`].
    pub fn put(self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        let meta = EntryMeta::new().with_bucket_id(DEFAULT_BUCKET);
        let entry = Entry::new(key, value, meta).expect("Failed to build entry");
        self.entry(entry)
    }

    /// Appends `len` zero bytes, as left by preallocation.
    pub fn zero_tail(mut self, len: usize) -> Self {
        self.data.resize(self.data.len() + len, 0);
        self
    }

    /// Appends only the first `keep` bytes of `entry`, as left by a write
    /// cut short by a crash.
    pub fn torn_entry(mut self, entry: Entry, keep: usize) -> Self {
        let bytes = entry.encode();
        let keep = keep.min(bytes.len());
        self.data.extend_from_slice(&bytes[..keep]);
        self
    }

    /// Appends raw bytes.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Returns the bytes built so far.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Writes the file into a new temporary directory.
    pub fn build(self) -> TestFile {
        let (temp_dir, path) = write_temp("0.dat", &self.data);
        TestFile {
            path,
            entries: self.entries,
            buckets: Vec::new(),
            valid_len: self.valid_len,
            _temp_dir: temp_dir,
        }
    }
}

/// Builds a bucket catalog.
#[derive(Default)]
pub struct CatalogBuilder {
    data: Vec<u8>,
    buckets: Vec<(u64, Bucket)>,
    valid_len: u64,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bucket record.
    pub fn bucket(mut self, bucket: Bucket) -> Self {
        let offset = self.data.len() as u64;
        let bytes = bucket.encode().expect("Failed to encode bucket");
        self.data.extend_from_slice(&bytes);
        self.valid_len = self.data.len() as u64;
        self.buckets.push((offset, bucket));
        self
    }

    /// Appends an insert of a B-tree bucket.
    pub fn insert(self, id: u64, name: &str) -> Self {
        self.bucket(Bucket::new(
            BucketOperation::Insert,
            BucketId::new(id),
            DataStructure::BTree,
            name,
        ))
    }

    /// Appends a delete of a B-tree bucket.
    pub fn delete(self, id: u64, name: &str) -> Self {
        self.bucket(Bucket::new(
            BucketOperation::Delete,
            BucketId::new(id),
            DataStructure::BTree,
            name,
        ))
    }

    /// Appends only the first `keep` bytes of `bucket`'s record.
    pub fn torn_bucket(mut self, bucket: &Bucket, keep: usize) -> Self {
        let bytes = bucket.encode().expect("Failed to encode bucket");
        let keep = keep.min(bytes.len());
        self.data.extend_from_slice(&bytes[..keep]);
        self
    }

    /// Returns the bytes built so far.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Writes the catalog into a new temporary directory.
    pub fn build(self) -> TestFile {
        let (temp_dir, path) = write_temp("bucket.Meta", &self.data);
        TestFile {
            path,
            entries: Vec::new(),
            buckets: self.buckets,
            valid_len: self.valid_len,
            _temp_dir: temp_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::{BucketRead, EntryRead};

    #[test]
    fn log_builder_records_offsets() {
        let file = LogFileBuilder::new().put("a", "1").put("bb", "22").build();
        let entries = file.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, 0);
        assert_eq!(entries[1].0, entries[0].1.encoded_len() as u64);
        assert_eq!(file.valid_len(), file.bytes().len() as u64);
    }

    #[test]
    fn zero_tail_is_not_valid_data() {
        let file = LogFileBuilder::new().put("a", "1").zero_tail(100).build();
        assert_eq!(file.bytes().len() as u64, file.valid_len() + 100);

        let mut reader = file.open();
        assert_eq!(
            reader.read_entry_at(file.valid_len()).unwrap(),
            EntryRead::EndOfData
        );
    }

    #[test]
    fn truncate_and_flip() {
        let file = LogFileBuilder::new().put("key", "value").build();
        let original = file.bytes();

        file.flip_bit(0, 3);
        assert_eq!(file.bytes()[0], original[0] ^ 0x08);

        file.truncate(4);
        assert_eq!(file.bytes().len(), 4);
    }

    #[test]
    fn catalog_builder() {
        let file = CatalogBuilder::new()
            .insert(1, "users")
            .delete(1, "users")
            .build();
        assert_eq!(file.buckets().len(), 2);

        let mut reader = file.open();
        for (offset, bucket) in file.buckets() {
            match reader.read_next_bucket().unwrap() {
                BucketRead::Bucket(recovered) => {
                    assert_eq!(recovered.offset, *offset);
                    assert_eq!(&recovered.bucket, bucket);
                }
                BucketRead::EndOfStream => panic!("catalog ended early"),
            }
        }
        assert_eq!(reader.read_next_bucket().unwrap(), BucketRead::EndOfStream);
    }
}
