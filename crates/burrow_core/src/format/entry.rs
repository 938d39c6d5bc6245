//! Log entry format.
//!
//! ```text
//! | crc u32 LE | timestamp | key_size | value_size | flag | ttl | status | ds | tx_id | bucket_id | key | value |
//! ```
//!
//! Every header field after the crc is a varint, so the header length is
//! only known once it has been parsed. The crc covers the header fields
//! after itself, the key and the value.

use super::error::FormatError;
use super::varint::{
    put_uvarint, read_uvarint, VarintError, MAX_VARINT_LEN16, MAX_VARINT_LEN32, MAX_VARINT_LEN64,
};
use crate::checksum::entry_checksum;
use crate::types::{BucketId, DataFlag, DataStatus, DataStructure, TxId, PERSISTENT_TTL};

/// Size of the crc field at the front of every header.
pub const CRC_SIZE: usize = 4;

/// Largest possible entry header.
///
/// crc + three u32 varints (key size, value size, ttl) + three u64 varints
/// (timestamp, tx id, bucket id) + three u16 varints (flag, status, ds).
pub const MAX_ENTRY_HEADER_SIZE: usize =
    CRC_SIZE + MAX_VARINT_LEN32 * 3 + MAX_VARINT_LEN64 * 3 + MAX_VARINT_LEN16 * 3;

/// Smallest possible entry header: crc plus nine single-byte varints.
pub const MIN_ENTRY_HEADER_SIZE: usize = CRC_SIZE + 9;

/// Entry header exactly as stored on disk.
///
/// Tag fields are kept as raw integers so a header can be parsed and
/// checksummed before its tags are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryHeader {
    /// Stored checksum.
    pub crc: u32,
    /// Write time in seconds.
    pub timestamp: u64,
    /// Key length in bytes.
    pub key_size: u32,
    /// Value length in bytes.
    pub value_size: u32,
    /// Raw [`DataFlag`].
    pub flag: u16,
    /// Time to live in seconds, `0` for persistent.
    pub ttl: u32,
    /// Raw [`DataStatus`].
    pub status: u16,
    /// Raw [`DataStructure`].
    pub ds: u16,
    /// Writing transaction.
    pub tx_id: u64,
    /// Owning bucket.
    pub bucket_id: u64,
}

struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl FieldReader<'_> {
    fn next(&mut self, field: &'static str) -> Result<u64, FormatError> {
        let (value, n) = read_uvarint(&self.buf[self.pos..]).map_err(|e| match e {
            VarintError::Truncated => FormatError::TruncatedVarint { field },
            VarintError::Overflow => FormatError::VarintOverflow { field },
        })?;
        self.pos += n;
        Ok(value)
    }

    fn next_u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        let value = self.next(field)?;
        u32::try_from(value).map_err(|_| FormatError::FieldOverflow { field, value })
    }

    fn next_u16(&mut self, field: &'static str) -> Result<u16, FormatError> {
        let value = self.next(field)?;
        u16::try_from(value).map_err(|_| FormatError::FieldOverflow { field, value })
    }
}

impl EntryHeader {
    /// Parses a header from the front of `buf`.
    ///
    /// `buf` may hold more than the header (a speculative read usually
    /// does). Returns the number of bytes the header occupies together with
    /// the decoded fields.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::HeaderTooShort`] if `buf` is shorter than
    /// [`MIN_ENTRY_HEADER_SIZE`], or a varint error if a field is truncated
    /// or too wide.
    pub fn parse(buf: &[u8]) -> Result<(usize, Self), FormatError> {
        if buf.len() < MIN_ENTRY_HEADER_SIZE {
            return Err(FormatError::HeaderTooShort {
                len: buf.len(),
                min: MIN_ENTRY_HEADER_SIZE,
            });
        }

        let crc = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let mut fields = FieldReader {
            buf,
            pos: CRC_SIZE,
        };

        let timestamp = fields.next("timestamp")?;
        let key_size = fields.next_u32("key_size")?;
        let value_size = fields.next_u32("value_size")?;
        let flag = fields.next_u16("flag")?;
        let ttl = fields.next_u32("ttl")?;
        let status = fields.next_u16("status")?;
        let ds = fields.next_u16("ds")?;
        let tx_id = fields.next("tx_id")?;
        let bucket_id = fields.next("bucket_id")?;

        let header = Self {
            crc,
            timestamp,
            key_size,
            value_size,
            flag,
            ttl,
            status,
            ds,
            tx_id,
            bucket_id,
        };
        Ok((fields.pos, header))
    }

    /// Returns true if every field is zero.
    ///
    /// Zero-filled space at the end of a preallocated or torn file parses
    /// this way, and marks the end of valid entries.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Key plus value length.
    #[must_use]
    pub fn payload_size(&self) -> u64 {
        u64::from(self.key_size) + u64::from(self.value_size)
    }

    /// Appends every field except the crc.
    fn encode_fields(&self, buf: &mut Vec<u8>) {
        put_uvarint(buf, self.timestamp);
        put_uvarint(buf, u64::from(self.key_size));
        put_uvarint(buf, u64::from(self.value_size));
        put_uvarint(buf, u64::from(self.flag));
        put_uvarint(buf, u64::from(self.ttl));
        put_uvarint(buf, u64::from(self.status));
        put_uvarint(buf, u64::from(self.ds));
        put_uvarint(buf, self.tx_id);
        put_uvarint(buf, self.bucket_id);
    }

    /// Interprets the raw tag fields.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown flag, status or data structure.
    pub fn to_meta(&self) -> Result<EntryMeta, FormatError> {
        Ok(EntryMeta {
            timestamp: self.timestamp,
            ttl: self.ttl,
            flag: DataFlag::from_u16(self.flag).ok_or(FormatError::UnknownFlag(self.flag))?,
            status: DataStatus::from_u16(self.status)
                .ok_or(FormatError::UnknownStatus(self.status))?,
            ds: DataStructure::from_u16(self.ds)
                .ok_or(FormatError::UnknownDataStructure(self.ds))?,
            tx_id: TxId::new(self.tx_id),
            bucket_id: BucketId::new(self.bucket_id),
        })
    }
}

/// Splits an assembled payload into key and value.
///
/// # Errors
///
/// Returns [`FormatError::PayloadLength`] if `payload` is not exactly
/// `key_size + value_size` bytes.
pub fn parse_payload(
    mut payload: Vec<u8>,
    header: &EntryHeader,
) -> Result<(Vec<u8>, Vec<u8>), FormatError> {
    if payload.len() as u64 != header.payload_size() {
        return Err(FormatError::PayloadLength {
            expected: header.payload_size(),
            actual: payload.len(),
        });
    }
    let value = payload.split_off(header.key_size as usize);
    Ok((payload, value))
}

/// Typed entry metadata, minus the sizes and checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    /// Write time in seconds.
    pub timestamp: u64,
    /// Time to live in seconds, [`PERSISTENT_TTL`] for none.
    pub ttl: u32,
    /// Operation.
    pub flag: DataFlag,
    /// Commit status.
    pub status: DataStatus,
    /// Data structure of the owning bucket.
    pub ds: DataStructure,
    /// Writing transaction.
    pub tx_id: TxId,
    /// Owning bucket.
    pub bucket_id: BucketId,
}

impl Default for EntryMeta {
    fn default() -> Self {
        Self {
            timestamp: 0,
            ttl: PERSISTENT_TTL,
            flag: DataFlag::Set,
            status: DataStatus::Committed,
            ds: DataStructure::BTree,
            tx_id: TxId::default(),
            bucket_id: BucketId::default(),
        }
    }
}

impl EntryMeta {
    /// Creates metadata for a committed B-tree `Set` with no TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the TTL.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the flag.
    #[must_use]
    pub const fn with_flag(mut self, flag: DataFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: DataStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the data structure.
    #[must_use]
    pub const fn with_ds(mut self, ds: DataStructure) -> Self {
        self.ds = ds;
        self
    }

    /// Sets the transaction.
    #[must_use]
    pub const fn with_tx_id(mut self, tx_id: TxId) -> Self {
        self.tx_id = tx_id;
        self
    }

    /// Sets the bucket.
    #[must_use]
    pub const fn with_bucket_id(mut self, bucket_id: BucketId) -> Self {
        self.bucket_id = bucket_id;
        self
    }
}

/// A key-value log entry with its checksum.
///
/// The checksum is computed when the entry is built, so an `Entry` always
/// encodes to bytes that verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: Vec<u8>,
    value: Vec<u8>,
    meta: EntryMeta,
    crc: u32,
}

impl Entry {
    /// Builds an entry and seals its checksum.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TooLarge`] if the key or value is longer than
    /// `u32::MAX` bytes.
    pub fn new(
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        meta: EntryMeta,
    ) -> Result<Self, FormatError> {
        let key = key.into();
        let value = value.into();
        let mut entry = Self {
            key,
            value,
            meta,
            crc: 0,
        };
        let header = entry.unsealed_header()?;

        let mut fields = Vec::with_capacity(MAX_ENTRY_HEADER_SIZE);
        header.encode_fields(&mut fields);
        entry.crc = entry_checksum(&fields, &entry.key, &entry.value);
        Ok(entry)
    }

    /// Rebuilds an entry from a verified header and its payload.
    pub(crate) fn from_parts(
        header: &EntryHeader,
        key: Vec<u8>,
        value: Vec<u8>,
    ) -> Result<Self, FormatError> {
        Ok(Self {
            key,
            value,
            meta: header.to_meta()?,
            crc: header.crc,
        })
    }

    fn unsealed_header(&self) -> Result<EntryHeader, FormatError> {
        let key_size = u32::try_from(self.key.len()).map_err(|_| FormatError::TooLarge {
            what: "key",
            len: self.key.len(),
        })?;
        let value_size = u32::try_from(self.value.len()).map_err(|_| FormatError::TooLarge {
            what: "value",
            len: self.value.len(),
        })?;
        Ok(EntryHeader {
            crc: 0,
            timestamp: self.meta.timestamp,
            key_size,
            value_size,
            flag: self.meta.flag.as_u16(),
            ttl: self.meta.ttl,
            status: self.meta.status.as_u16(),
            ds: self.meta.ds.as_u16(),
            tx_id: self.meta.tx_id.as_u64(),
            bucket_id: self.meta.bucket_id.as_u64(),
        })
    }

    /// Returns the key.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the value.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the metadata.
    #[must_use]
    pub fn meta(&self) -> &EntryMeta {
        &self.meta
    }

    /// Returns the checksum.
    #[must_use]
    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Returns the on-disk header of this entry.
    #[must_use]
    pub fn header(&self) -> EntryHeader {
        // Sizes were validated in `new`/`from_parts`, both of which bound
        // them by u32.
        EntryHeader {
            crc: self.crc,
            timestamp: self.meta.timestamp,
            key_size: self.key.len() as u32,
            value_size: self.value.len() as u32,
            flag: self.meta.flag.as_u16(),
            ttl: self.meta.ttl,
            status: self.meta.status.as_u16(),
            ds: self.meta.ds.as_u16(),
            tx_id: self.meta.tx_id.as_u64(),
            bucket_id: self.meta.bucket_id.as_u64(),
        }
    }

    /// Encodes the entry: header, key, value.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(MAX_ENTRY_HEADER_SIZE + self.key.len() + self.value.len());
        buf.extend_from_slice(&self.crc.to_le_bytes());
        self.header().encode_fields(&mut buf);
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);
        buf
    }

    /// Number of bytes [`encode`](Self::encode) produces.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let mut fields = Vec::with_capacity(MAX_ENTRY_HEADER_SIZE);
        self.header().encode_fields(&mut fields);
        CRC_SIZE + fields.len() + self.key.len() + self.value.len()
    }
}
