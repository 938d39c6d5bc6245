//! On-disk record formats read during recovery.
//!
//! Two record kinds live in Burrow's files:
//!
//! - **Entries** in data files: a varint header of unknown length followed
//!   by key and value bytes. See [`entry`].
//! - **Buckets** in the catalog file: fixed ten-byte metadata followed by a
//!   payload of declared size. See [`bucket`].
//!
//! Both carry a CRC-32 over everything but the crc field itself.

pub mod bucket;
pub mod entry;
mod error;
pub mod varint;

pub use bucket::{Bucket, BucketMeta, BUCKET_META_SIZE};
pub use entry::{
    parse_payload, Entry, EntryHeader, EntryMeta, CRC_SIZE, MAX_ENTRY_HEADER_SIZE,
    MIN_ENTRY_HEADER_SIZE,
};
pub use error::FormatError;
