//! # Burrow Testkit
//!
//! Test utilities for Burrow.
//!
//! This crate provides:
//! - Builders that write data files and bucket catalogs into temporary
//!   directories, including zero-filled and torn tails
//! - Helpers that damage files the way a crash or bad disk would
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burrow_testkit::prelude::*;
//!
//! #[test]
//! fn recovers_up_to_torn_tail() {
//!     let file = LogFileBuilder::new()
//!         .put("a", "1")
//!         .put("b", "2")
//!         .torn_entry(Entry::new("c", "3", EntryMeta::new()).unwrap(), 5)
//!         .build();
//!     let mut reader = file.open();
//!     assert_eq!(reader.entries(0).filter(Result::is_ok).count(), 2);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use burrow_core::{
        Bucket, BucketId, BucketOperation, DataFlag, DataStatus, DataStructure, Entry, EntryMeta,
        TxId,
    };
}

pub use fixtures::*;
pub use generators::*;
