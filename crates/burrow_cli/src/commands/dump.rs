//! Dump commands implementation.

use super::{display_bytes, hex_encode, OutputFormat};
use burrow_core::{CoreError, Entry, RecoveredBucket, RecoveryConfig, RecoveryReader};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Entry representation for output.
#[derive(Debug, Serialize)]
pub struct EntryInfo {
    /// Offset in the data file.
    pub offset: u64,
    /// Bytes the entry occupies on disk.
    pub size: usize,
    /// Stored checksum, hex-encoded.
    pub crc: String,
    /// Write timestamp.
    pub timestamp: u64,
    /// Time to live in seconds; 0 is persistent.
    pub ttl: u32,
    /// Operation flag.
    pub flag: String,
    /// Commit status.
    pub status: String,
    /// Data structure of the owning bucket.
    pub ds: String,
    /// Transaction id.
    pub tx_id: u64,
    /// Owning bucket id.
    pub bucket_id: u64,
    /// Key, hex-encoded.
    pub key: String,
    /// Value length in bytes.
    pub value_size: usize,
}

impl EntryInfo {
    fn new(offset: u64, entry: &Entry) -> Self {
        let meta = entry.meta();
        Self {
            offset,
            size: entry.encoded_len(),
            crc: format!("{:08x}", entry.crc()),
            timestamp: meta.timestamp,
            ttl: meta.ttl,
            flag: format!("{:?}", meta.flag),
            status: format!("{:?}", meta.status),
            ds: meta.ds.to_string(),
            tx_id: meta.tx_id.as_u64(),
            bucket_id: meta.bucket_id.as_u64(),
            key: hex_encode(entry.key()),
            value_size: entry.value().len(),
        }
    }
}

/// Bucket record representation for output.
#[derive(Debug, Serialize)]
pub struct BucketInfo {
    /// Offset in the catalog file.
    pub offset: u64,
    /// Catalog operation.
    pub op: String,
    /// Bucket id.
    pub id: u64,
    /// Data structure.
    pub ds: String,
    /// Bucket name.
    pub name: String,
}

impl From<&RecoveredBucket> for BucketInfo {
    fn from(recovered: &RecoveredBucket) -> Self {
        let bucket = &recovered.bucket;
        Self {
            offset: recovered.offset,
            op: format!("{:?}", bucket.op),
            id: bucket.id.as_u64(),
            ds: bucket.ds.to_string(),
            name: bucket.name.clone(),
        }
    }
}

/// Reads up to `limit` entries starting at `start_offset`.
///
/// Returns the entries recovered before the first failure along with the
/// failure, if any.
pub fn read_entries(
    path: &Path,
    config: &RecoveryConfig,
    start_offset: u64,
    limit: Option<usize>,
) -> Result<(Vec<(u64, Entry)>, Option<CoreError>), CoreError> {
    let mut reader = RecoveryReader::open_with_config(path, config)?;
    let max_records = limit.unwrap_or(usize::MAX);

    let mut entries = Vec::new();
    let mut failure = None;
    for item in reader.entries(start_offset).take(max_records) {
        match item {
            Ok(pair) => entries.push(pair),
            Err(e) => failure = Some(e),
        }
    }
    reader.release()?;
    info!(
        path = %path.display(),
        start_offset,
        records = entries.len(),
        failed = failure.is_some(),
        "read entries"
    );

    Ok((entries, failure))
}

/// Runs the dump-log command.
pub fn run_log(
    path: &Path,
    config: &RecoveryConfig,
    start_offset: u64,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (entries, failure) = read_entries(path, config, start_offset, limit)?;

    match format {
        OutputFormat::Json => {
            let infos: Vec<EntryInfo> = entries
                .iter()
                .map(|(offset, entry)| EntryInfo::new(*offset, entry))
                .collect();
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        OutputFormat::Text => print_entries(&entries),
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Runs the dump-buckets command.
pub fn run_buckets(
    path: &Path,
    config: &RecoveryConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = RecoveryReader::open_with_config(path, config)?;
    let mut infos = Vec::new();
    let mut failure = None;
    for item in reader.buckets() {
        match item {
            Ok(recovered) => infos.push(BucketInfo::from(&recovered)),
            Err(e) => failure = Some(e),
        }
    }
    reader.release()?;
    info!(path = %path.display(), records = infos.len(), "read bucket records");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
        OutputFormat::Text => {
            println!("Bucket records ({} total)", infos.len());
            println!("================");
            for info in &infos {
                println!(
                    "[{:08}] {:6} id={} ds={} name={:?}",
                    info.offset, info.op, info.id, info.ds, info.name
                );
            }
        }
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn print_entries(entries: &[(u64, Entry)]) {
    println!("Entries ({} total)", entries.len());
    println!("================");
    println!();

    for (offset, entry) in entries {
        let meta = entry.meta();
        print!(
            "[{:08}] {:?} {:?} {} {} {}",
            offset, meta.flag, meta.status, meta.ds, meta.bucket_id, meta.tx_id
        );
        print!(" ts={}", meta.timestamp);
        if meta.ttl != burrow_core::PERSISTENT_TTL {
            print!(" ttl={}", meta.ttl);
        }
        print!(" key={}", display_bytes(entry.key()));
        println!(" value={} bytes", entry.value().len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::{BucketId, DataFlag, EntryMeta, ErrorKind};
    use std::fs;
    use tempfile::tempdir;

    fn write_log(path: &Path, n: u64) -> Vec<u8> {
        let data: Vec<u8> = (0..n)
            .flat_map(|i| {
                let meta = EntryMeta::new()
                    .with_timestamp(1_700_000_000 + i)
                    .with_bucket_id(BucketId::new(1));
                Entry::new(i.to_le_bytes().to_vec(), vec![0u8; 8], meta)
                    .unwrap()
                    .encode()
            })
            .collect();
        fs::write(path, &data).unwrap();
        data
    }

    #[test]
    fn limit_and_offset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.dat");
        write_log(&path, 10);

        let config = RecoveryConfig::default();
        let (all, failure) = read_entries(&path, &config, 0, None).unwrap();
        assert_eq!(all.len(), 10);
        assert!(failure.is_none());

        let (some, _) = read_entries(&path, &config, all[4].0, Some(3)).unwrap();
        assert_eq!(some.len(), 3);
        assert_eq!(some[0], all[4]);
        assert_eq!(some[2], all[6]);
    }

    #[test]
    fn failure_is_returned_with_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.dat");
        let data = write_log(&path, 4);
        fs::write(&path, &data[..data.len() - 4]).unwrap();

        let (entries, failure) = read_entries(&path, &RecoveryConfig::default(), 0, None).unwrap();
        assert_eq!(entries.len(), 3);
        let err = failure.unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.is_truncation());
    }

    #[test]
    fn entry_info_fields() {
        let meta = EntryMeta::new()
            .with_timestamp(42)
            .with_flag(DataFlag::Delete)
            .with_bucket_id(BucketId::new(7));
        let entry = Entry::new("k", "v", meta).unwrap();
        let info = EntryInfo::new(128, &entry);

        assert_eq!(info.offset, 128);
        assert_eq!(info.size, entry.encoded_len());
        assert_eq!(info.flag, "Delete");
        assert_eq!(info.bucket_id, 7);
        assert_eq!(info.key, "6b");
        assert_eq!(info.value_size, 1);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["flag"], "Delete");
    }
}
