//! Verify command implementation.

use super::CliError;
use burrow_core::format::BUCKET_META_SIZE;
use burrow_core::{CoreError, CoreResult, RecoveryConfig, RecoveryReader, ScanStop};
use std::path::Path;
use tracing::info;

/// How a scan ended.
#[derive(Debug)]
pub enum Outcome {
    /// A zero header or the end of the catalog.
    Clean,
    /// The last entry ended exactly at the end of the file.
    EndOfFile,
    /// A record could not be recovered.
    Corrupt(CoreError),
}

/// Result of scanning one file.
#[derive(Debug)]
pub struct ScanReport {
    /// Number of records recovered.
    pub records: usize,
    /// Offset where recovery stopped.
    pub stop_offset: u64,
    /// Size of the file.
    pub file_size: u64,
    /// Why the scan ended.
    pub outcome: Outcome,
}

impl ScanReport {
    fn is_ok(&self) -> bool {
        !matches!(self.outcome, Outcome::Corrupt(_))
    }
}

/// Scans every entry of a data file.
pub fn scan_log(path: &Path, config: &RecoveryConfig) -> CoreResult<ScanReport> {
    info!(path = %path.display(), "scanning data file");
    let mut reader = RecoveryReader::open_with_config(path, config)?;
    let file_size = reader.file_size();

    let mut records = 0;
    let mut failure = None;
    let mut iter = reader.entries(0);
    for item in iter.by_ref() {
        match item {
            Ok(_) => records += 1,
            Err(e) => failure = Some(e),
        }
    }
    let stop_offset = iter.offset();
    let outcome = match (failure, iter.stop()) {
        (Some(e), _) => Outcome::Corrupt(e),
        (None, Some(ScanStop::EndOfData)) => Outcome::Clean,
        (None, _) => Outcome::EndOfFile,
    };
    reader.release()?;
    info!(records, stop_offset, file_size, "data file scan complete");

    Ok(ScanReport {
        records,
        stop_offset,
        file_size,
        outcome,
    })
}

/// Scans every record of a bucket catalog.
pub fn scan_buckets(path: &Path, config: &RecoveryConfig) -> CoreResult<ScanReport> {
    info!(path = %path.display(), "scanning bucket catalog");
    let mut reader = RecoveryReader::open_with_config(path, config)?;
    let file_size = reader.file_size();

    let mut records = 0;
    let mut stop_offset = 0;
    let mut failure = None;
    for item in reader.buckets() {
        match item {
            Ok(recovered) => {
                records += 1;
                stop_offset =
                    recovered.offset + BUCKET_META_SIZE as u64 + u64::from(recovered.meta.size);
            }
            Err(e) => failure = Some(e),
        }
    }
    reader.release()?;
    info!(records, stop_offset, file_size, "bucket catalog scan complete");

    let outcome = match failure {
        Some(e) => Outcome::Corrupt(e),
        None => Outcome::Clean,
    };
    Ok(ScanReport {
        records,
        stop_offset,
        file_size,
        outcome,
    })
}

/// Runs the verify-log command.
pub fn run_log(path: &Path, config: &RecoveryConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying data file {:?}", path);
    let report = scan_log(path, config)?;
    finish(path, "entries", &report)
}

/// Runs the verify-buckets command.
pub fn run_buckets(
    path: &Path,
    config: &RecoveryConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying bucket catalog {:?}", path);
    let report = scan_buckets(path, config)?;
    finish(path, "buckets", &report)
}

fn finish(path: &Path, what: &str, report: &ScanReport) -> Result<(), Box<dyn std::error::Error>> {
    print_report(what, report);
    println!();

    if report.is_ok() {
        println!("✓ Verification passed");
        return Ok(());
    }

    println!("✗ Verification failed");
    match &report.outcome {
        Outcome::Corrupt(e) => Err(CliError::Corrupt {
            path: path.to_path_buf(),
            kind: e.kind(),
            offset: e.offset().unwrap_or(report.stop_offset),
        }
        .into()),
        _ => Ok(()),
    }
}

fn print_report(what: &str, report: &ScanReport) {
    println!(
        "  {} recovered: {}, stopped at offset {} of {}",
        what, report.records, report.stop_offset, report.file_size
    );
    match &report.outcome {
        Outcome::Clean => println!("  ended cleanly"),
        Outcome::EndOfFile => println!("  ended at end of file"),
        Outcome::Corrupt(e) => {
            println!("    ERROR: {}", e);
            if e.is_truncation() {
                println!("    (file ends inside this record; likely a torn write)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::{
        Bucket, BucketId, BucketOperation, DataStructure, Entry, EntryMeta, ErrorKind,
    };
    use std::fs;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn log_bytes(n: usize) -> Vec<u8> {
        (0..n)
            .flat_map(|i| {
                Entry::new(format!("key{i}"), format!("value{i}"), EntryMeta::new())
                    .unwrap()
                    .encode()
            })
            .collect()
    }

    #[test]
    fn clean_log_with_zero_tail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.dat");
        let mut data = log_bytes(5);
        let end = data.len() as u64;
        data.resize(4096, 0);
        fs::write(&path, &data).unwrap();

        let report = scan_log(&path, &RecoveryConfig::default()).unwrap();
        assert_eq!(report.records, 5);
        assert_eq!(report.stop_offset, end);
        assert_eq!(report.file_size, 4096);
        assert!(matches!(report.outcome, Outcome::Clean));
        assert!(finish(&path, "entries", &report).is_ok());
    }

    #[test]
    fn log_ending_at_file_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.dat");
        fs::write(&path, log_bytes(3)).unwrap();

        let report = scan_log(&path, &RecoveryConfig::default()).unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(report.stop_offset, report.file_size);
        assert!(matches!(report.outcome, Outcome::EndOfFile));
    }

    #[test]
    fn corrupt_log_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.dat");
        let mut data = log_bytes(3);
        let last = data.len() - 1;
        data[last] ^= 0x10;
        fs::write(&path, &data).unwrap();

        let report = scan_log(&path, &RecoveryConfig::default()).unwrap();
        assert_eq!(report.records, 2);
        match &report.outcome {
            Outcome::Corrupt(e) => assert_eq!(e.kind(), ErrorKind::Checksum),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(finish(&path, "entries", &report).is_err());
    }

    #[test]
    fn bucket_catalog_scan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bucket.Meta");
        let mut data = Vec::new();
        for (id, name) in [(1, "users"), (2, "orders")] {
            let bucket = Bucket::new(
                BucketOperation::Insert,
                BucketId::new(id),
                DataStructure::BTree,
                name,
            );
            data.extend_from_slice(&bucket.encode().unwrap());
        }
        fs::write(&path, &data).unwrap();

        let report = scan_buckets(&path, &RecoveryConfig::default()).unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.stop_offset, data.len() as u64);
        assert!(matches!(report.outcome, Outcome::Clean));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(scan_log(&dir.path().join("missing"), &RecoveryConfig::default()).is_err());
    }

    #[test]
    fn scan_logs_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.dat");
        let data = log_bytes(4);
        fs::write(&path, &data).unwrap();

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        let report = tracing::subscriber::with_default(subscriber, || {
            scan_log(&path, &RecoveryConfig::default()).unwrap()
        });
        assert_eq!(report.records, 4);

        let output = log.contents();
        assert!(output.contains("scanning data file"), "{output}");
        assert!(output.contains("data file scan complete"), "{output}");
        assert!(output.contains("records=4"), "{output}");
        assert!(output.contains(&format!("stop_offset={}", data.len())), "{output}");
    }
}
