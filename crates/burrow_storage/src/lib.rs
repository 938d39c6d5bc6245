//! # Burrow Storage
//!
//! File access layer used by Burrow's crash recovery.
//!
//! This crate knows nothing about entry or bucket formats. It opens a data
//! or catalog file, captures its size, and offers two ways to read it:
//! positioned reads at absolute offsets, and a buffered forward-only
//! stream. It also owns the policy that sizes the stream's buffer.
//!
//! ## Example
//!
//! ```no_run
//! use burrow_storage::RecoveryFile;
//! use std::path::Path;
//!
//! let mut file = RecoveryFile::open(Path::new("0.dat"), 4096).unwrap();
//! let mut header = [0u8; 16];
//! file.read_exact_at(0, &mut header).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod error;
mod file;

pub use buffer::{effective_buffer_size, BLOCK_SIZE, KB, MB};
pub use error::{StorageError, StorageResult};
pub use file::RecoveryFile;
