//! Error types for Burrow recovery.

use crate::format::FormatError;
use burrow_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while recovering a file.
///
/// Every variant except [`CoreError::Storage`] names the offset of the
/// record it concerns, so the caller can decide whether to truncate the
/// file there, skip the file, or give up.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The file could not be opened or inspected.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A read failed or the file ended inside a record.
    #[error("read failed at offset {offset}: {source}")]
    Read {
        /// Offset of the record being read.
        offset: u64,
        /// Underlying failure.
        #[source]
        source: StorageError,
    },

    /// The bytes at `offset` are not a well-formed record.
    #[error("invalid record at offset {offset}: {source}")]
    Format {
        /// Offset of the record being decoded.
        offset: u64,
        /// What was wrong with it.
        #[source]
        source: FormatError,
    },

    /// A well-formed record whose checksum does not match its contents.
    #[error("checksum mismatch at offset {offset}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Offset of the record.
        offset: u64,
        /// Checksum stored in the record.
        expected: u32,
        /// Checksum computed from its bytes.
        actual: u32,
    },
}

/// Broad classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operating system or short-read failure.
    Io,
    /// Structurally invalid bytes.
    Format,
    /// Checksum mismatch.
    Checksum,
}

impl CoreError {
    /// Returns the broad kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) | Self::Read { .. } => ErrorKind::Io,
            Self::Format { .. } => ErrorKind::Format,
            Self::ChecksumMismatch { .. } => ErrorKind::Checksum,
        }
    }

    /// Returns the offset of the record the error concerns, if any.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Storage(_) => None,
            Self::Read { offset, .. }
            | Self::Format { offset, .. }
            | Self::ChecksumMismatch { offset, .. } => Some(*offset),
        }
    }

    /// Returns true if the file ended before the record at the error's
    /// offset was complete, which is what a write torn by a crash looks like.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        match self {
            Self::Read { source, .. } => source.is_unexpected_eof(),
            Self::Format {
                source: FormatError::HeaderTooShort { .. } | FormatError::TruncatedVarint { .. },
                ..
            } => true,
            _ => false,
        }
    }

    pub(crate) fn read(offset: u64, source: impl Into<StorageError>) -> Self {
        Self::Read {
            offset,
            source: source.into(),
        }
    }

    pub(crate) fn format(offset: u64, source: FormatError) -> Self {
        Self::Format { offset, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn kinds_and_offsets() {
        let err = CoreError::ChecksumMismatch {
            offset: 42,
            expected: 1,
            actual: 2,
        };
        assert_eq!(err.kind(), ErrorKind::Checksum);
        assert_eq!(err.offset(), Some(42));
        assert!(!err.is_truncation());

        let err = CoreError::format(7, FormatError::UnknownFlag(99));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.offset(), Some(7));

        let err = CoreError::Storage(StorageError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "missing",
        )));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn truncation_detection() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "short");
        assert!(CoreError::read(10, eof).is_truncation());

        let err = CoreError::format(
            10,
            FormatError::HeaderTooShort {
                len: 3,
                min: 13,
            },
        );
        assert!(err.is_truncation());

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "no");
        assert!(!CoreError::read(10, denied).is_truncation());
    }

    #[test]
    fn display_includes_offset() {
        let err = CoreError::ChecksumMismatch {
            offset: 128,
            expected: 0xDEAD_BEEF,
            actual: 0x0BAD_F00D,
        };
        let msg = err.to_string();
        assert!(msg.contains("offset 128"));
        assert!(msg.contains("deadbeef"));
        assert!(msg.contains("0badf00d"));
    }
}
