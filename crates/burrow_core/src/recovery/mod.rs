//! Crash recovery readers.
//!
//! [`RecoveryReader`] owns one open file and reads either entries from a
//! data file or records from the bucket catalog. [`EntryIter`] and
//! [`BucketIter`] drive it over a whole file.

mod iterator;
mod reader;

pub use iterator::{BucketIter, EntryIter, ScanStop};
pub use reader::{BucketRead, EntryRead, RecoveredBucket, RecoveredEntry, RecoveryReader};
