//! Bucket catalog record format.
//!
//! ```text
//! | crc u32 LE | op u16 LE | size u32 LE | id u64 LE | ds u16 LE | name |
//! ```
//!
//! The first three fields are the fixed-size metadata; `size` is the
//! length of the payload (id, ds and name) that follows. The crc covers
//! the metadata after itself and the payload.

use super::error::FormatError;
use crate::checksum::bucket_checksum;
use crate::types::{BucketId, BucketOperation, DataStructure};

/// Size of a bucket record's metadata.
pub const BUCKET_META_SIZE: usize = 4 + 2 + 4;

/// Width of the bucket id in the payload.
pub const BUCKET_ID_SIZE: usize = 8;

/// Width of the data structure tag in the payload.
pub const BUCKET_DS_SIZE: usize = 2;

/// Bucket record metadata as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketMeta {
    /// Stored checksum.
    pub crc: u32,
    /// Raw [`BucketOperation`].
    pub op: u16,
    /// Payload length in bytes.
    pub size: u32,
}

impl BucketMeta {
    /// Decodes metadata. Any ten bytes decode; validity is established by
    /// the checksum and [`operation`](Self::operation).
    #[must_use]
    pub fn decode(buf: &[u8; BUCKET_META_SIZE]) -> Self {
        Self {
            crc: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            op: u16::from_le_bytes([buf[4], buf[5]]),
            size: u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]),
        }
    }

    /// Encodes metadata.
    #[must_use]
    pub fn encode(&self) -> [u8; BUCKET_META_SIZE] {
        let mut buf = [0u8; BUCKET_META_SIZE];
        buf[0..4].copy_from_slice(&self.crc.to_le_bytes());
        buf[4..6].copy_from_slice(&self.op.to_le_bytes());
        buf[6..10].copy_from_slice(&self.size.to_le_bytes());
        buf
    }

    /// Interprets the operation tag.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownBucketOperation`] for unknown tags.
    pub fn operation(&self) -> Result<BucketOperation, FormatError> {
        BucketOperation::from_u16(self.op).ok_or(FormatError::UnknownBucketOperation(self.op))
    }
}

/// A bucket catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// What happened to the bucket.
    pub op: BucketOperation,
    /// Bucket identifier.
    pub id: BucketId,
    /// Data structure backing the bucket.
    pub ds: DataStructure,
    /// Bucket name.
    pub name: String,
}

impl Bucket {
    /// Creates a bucket record.
    pub fn new(
        op: BucketOperation,
        id: BucketId,
        ds: DataStructure,
        name: impl Into<String>,
    ) -> Self {
        Self {
            op,
            id,
            ds,
            name: name.into(),
        }
    }

    /// Encodes the payload: id, ds, name.
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(BUCKET_ID_SIZE + BUCKET_DS_SIZE + self.name.len());
        buf.extend_from_slice(&self.id.as_u64().to_le_bytes());
        buf.extend_from_slice(&self.ds.as_u16().to_le_bytes());
        buf.extend_from_slice(self.name.as_bytes());
        buf
    }

    /// Builds the metadata for this record, checksum included.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TooLarge`] if the payload exceeds `u32::MAX`.
    pub fn meta(&self) -> Result<BucketMeta, FormatError> {
        let payload = self.encode_payload();
        self.meta_for(&payload)
    }

    fn meta_for(&self, payload: &[u8]) -> Result<BucketMeta, FormatError> {
        let size = u32::try_from(payload.len()).map_err(|_| FormatError::TooLarge {
            what: "bucket payload",
            len: payload.len(),
        })?;
        let mut meta = BucketMeta {
            crc: 0,
            op: self.op.as_u16(),
            size,
        };
        meta.crc = bucket_checksum(&meta.encode()[4..], payload);
        Ok(meta)
    }

    /// Encodes the full record: metadata then payload.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TooLarge`] if the payload exceeds `u32::MAX`.
    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        let payload = self.encode_payload();
        let meta = self.meta_for(&payload)?;

        let mut buf = Vec::with_capacity(BUCKET_META_SIZE + payload.len());
        buf.extend_from_slice(&meta.encode());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decodes a payload against its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is shorter than the id and tag, the
    /// operation or data structure tag is unknown, or the name is not UTF-8.
    pub fn decode_payload(payload: &[u8], meta: &BucketMeta) -> Result<Self, FormatError> {
        const MIN: usize = BUCKET_ID_SIZE + BUCKET_DS_SIZE;
        if payload.len() < MIN {
            return Err(FormatError::BucketPayloadTooShort {
                len: payload.len(),
                min: MIN,
            });
        }

        let op = meta.operation()?;
        let mut id = [0u8; BUCKET_ID_SIZE];
        id.copy_from_slice(&payload[..BUCKET_ID_SIZE]);
        let raw_ds = u16::from_le_bytes([payload[BUCKET_ID_SIZE], payload[BUCKET_ID_SIZE + 1]]);
        let ds = DataStructure::from_u16(raw_ds).ok_or(FormatError::UnknownDataStructure(raw_ds))?;
        let name = std::str::from_utf8(&payload[MIN..])
            .map_err(|_| FormatError::InvalidBucketName)?
            .to_owned();

        Ok(Self {
            op,
            id: BucketId::new(u64::from_le_bytes(id)),
            ds,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bucket {
        Bucket::new(
            BucketOperation::Insert,
            BucketId::new(1),
            DataStructure::BTree,
            "bucket_1",
        )
    }

    #[test]
    fn meta_size() {
        assert_eq!(BUCKET_META_SIZE, 10);
    }

    #[test]
    fn encode_layout() {
        let bucket = sample();
        let bytes = bucket.encode().unwrap();
        assert_eq!(bytes.len(), BUCKET_META_SIZE + 8 + 2 + 8);

        let meta = BucketMeta::decode(bytes[..BUCKET_META_SIZE].try_into().unwrap());
        assert_eq!(meta.op, 1);
        assert_eq!(meta.size, 8 + 2 + 8);
        assert_eq!(meta, bucket.meta().unwrap());
        assert_eq!(
            meta.crc,
            bucket_checksum(&bytes[4..BUCKET_META_SIZE], &bytes[BUCKET_META_SIZE..])
        );
    }

    #[test]
    fn decode_payload_roundtrip() {
        let bucket = sample();
        let bytes = bucket.encode().unwrap();
        let meta = BucketMeta::decode(bytes[..BUCKET_META_SIZE].try_into().unwrap());
        let decoded = Bucket::decode_payload(&bytes[BUCKET_META_SIZE..], &meta).unwrap();
        assert_eq!(decoded, bucket);
    }

    #[test]
    fn empty_name_is_allowed() {
        let bucket = Bucket::new(
            BucketOperation::Delete,
            BucketId::new(9),
            DataStructure::List,
            "",
        );
        let meta = bucket.meta().unwrap();
        let decoded = Bucket::decode_payload(&bucket.encode_payload(), &meta).unwrap();
        assert_eq!(decoded.name, "");
        assert_eq!(meta.size, 10);
    }

    #[test]
    fn short_payload_is_rejected() {
        let meta = sample().meta().unwrap();
        let err = Bucket::decode_payload(&[0u8; 9], &meta).unwrap_err();
        assert_eq!(err, FormatError::BucketPayloadTooShort { len: 9, min: 10 });
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut meta = sample().meta().unwrap();
        let payload = sample().encode_payload();

        meta.op = 0;
        assert_eq!(
            Bucket::decode_payload(&payload, &meta).unwrap_err(),
            FormatError::UnknownBucketOperation(0)
        );

        let meta = sample().meta().unwrap();
        let mut payload = sample().encode_payload();
        payload[8] = 0x40;
        assert_eq!(
            Bucket::decode_payload(&payload, &meta).unwrap_err(),
            FormatError::UnknownDataStructure(0x40)
        );
    }

    #[test]
    fn invalid_name_is_rejected() {
        let meta = sample().meta().unwrap();
        let mut payload = sample().encode_payload();
        payload.push(0xFF);
        assert_eq!(
            Bucket::decode_payload(&payload, &meta).unwrap_err(),
            FormatError::InvalidBucketName
        );
    }
}
