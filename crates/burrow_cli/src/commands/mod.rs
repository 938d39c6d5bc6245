//! CLI command implementations.

pub mod dump;
pub mod verify;

use burrow_core::ErrorKind;
use clap::ValueEnum;
use std::path::PathBuf;
use thiserror::Error;

/// Output format for dump commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per record.
    Text,
    /// Pretty-printed JSON array.
    Json,
}

/// Failures reported through the process exit status.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file did not recover cleanly.
    #[error("{path}: {kind:?} error at offset {offset}")]
    Corrupt {
        /// File that failed.
        path: PathBuf,
        /// Broad kind of the failure.
        kind: ErrorKind,
        /// Offset of the record that failed.
        offset: u64,
    },
}

/// Lower-case hex of `bytes`.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Shows `bytes` as text when it is printable UTF-8 and as hex otherwise.
pub fn display_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) if s.chars().all(|c| !c.is_control()) => format!("{s:?}"),
        _ => format!("0x{}", hex_encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_display() {
        assert_eq!(display_bytes(b"key"), "\"key\"");
        assert_eq!(display_bytes(&[0x00, 0xff]), "0x00ff");
        assert_eq!(display_bytes(b"a\nb"), "0x610a62");
        assert_eq!(display_bytes(b""), "\"\"");
    }
}
