//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read beyond the size captured when the file was opened.
    #[error("read beyond end of file: offset {offset}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: u64,
        /// The file size captured at open time.
        size: u64,
    },
}

impl StorageError {
    /// Returns true if the error means the file ended before the read
    /// could be satisfied.
    #[must_use]
    pub fn is_unexpected_eof(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            Self::ReadPastEnd { .. } => true,
        }
    }
}
