//! Structural decoding errors.

use thiserror::Error;

/// Bytes that do not have the shape of an entry or bucket record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Fewer bytes than the smallest possible entry header.
    #[error("header too short: {len} bytes, need at least {min}")]
    HeaderTooShort {
        /// Bytes available.
        len: usize,
        /// Minimum header size.
        min: usize,
    },

    /// A varint ran off the end of the buffer.
    #[error("truncated varint in field `{field}`")]
    TruncatedVarint {
        /// Header field being decoded.
        field: &'static str,
    },

    /// A varint encodes more than 64 bits.
    #[error("varint overflow in field `{field}`")]
    VarintOverflow {
        /// Header field being decoded.
        field: &'static str,
    },

    /// A decoded value does not fit the field's width.
    #[error("value {value} does not fit field `{field}`")]
    FieldOverflow {
        /// Header field being decoded.
        field: &'static str,
        /// Decoded value.
        value: u64,
    },

    /// The payload length disagrees with the header's key and value sizes.
    #[error("payload is {actual} bytes, header declares {expected}")]
    PayloadLength {
        /// Length implied by the header.
        expected: u64,
        /// Length supplied.
        actual: usize,
    },

    /// Unrecognized entry flag.
    #[error("unknown entry flag {0}")]
    UnknownFlag(u16),

    /// Unrecognized entry status.
    #[error("unknown entry status {0}")]
    UnknownStatus(u16),

    /// Unrecognized data structure kind.
    #[error("unknown data structure {0}")]
    UnknownDataStructure(u16),

    /// Unrecognized bucket operation.
    #[error("unknown bucket operation {0}")]
    UnknownBucketOperation(u16),

    /// A bucket payload too short to hold the id and kind.
    #[error("bucket payload too short: {len} bytes, need at least {min}")]
    BucketPayloadTooShort {
        /// Bytes available.
        len: usize,
        /// Minimum payload size.
        min: usize,
    },

    /// The bucket name is not UTF-8.
    #[error("bucket name is not valid UTF-8")]
    InvalidBucketName,

    /// A key, value or name too long for its length field.
    #[error("{what} too large to encode: {len} bytes")]
    TooLarge {
        /// What was being encoded.
        what: &'static str,
        /// Its length.
        len: usize,
    },
}
