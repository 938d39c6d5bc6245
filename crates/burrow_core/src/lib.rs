//! # Burrow Core
//!
//! Crash recovery for Burrow's log-structured store.
//!
//! This crate provides:
//! - On-disk entry and bucket catalog formats
//! - CRC-32 verification of every record
//! - [`RecoveryReader`], which reads entries at arbitrary offsets and
//!   bucket records in sequence, reporting the offset of anything it
//!   cannot trust
//!
//! ## Example
//!
//! ```no_run
//! use burrow_core::{RecoveryConfig, RecoveryReader};
//! use std::path::Path;
//!
//! let mut reader = RecoveryReader::open_with_config(Path::new("0.dat"), &RecoveryConfig::default())?;
//! for item in reader.entries(0) {
//!     let (offset, entry) = item?;
//!     println!("{offset}: {} bytes of key", entry.key().len());
//! }
//! # Ok::<(), burrow_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod checksum;
mod config;
mod error;
pub mod format;
mod recovery;
mod types;

pub use checksum::{bucket_checksum, compute_crc32, entry_checksum};
pub use config::RecoveryConfig;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use format::{Bucket, BucketMeta, Entry, EntryHeader, EntryMeta, FormatError};
pub use recovery::{
    BucketIter, BucketRead, EntryIter, EntryRead, RecoveredBucket, RecoveredEntry,
    RecoveryReader, ScanStop,
};
pub use types::{
    BucketId, BucketOperation, DataFlag, DataStatus, DataStructure, TxId, PERSISTENT_TTL,
};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
