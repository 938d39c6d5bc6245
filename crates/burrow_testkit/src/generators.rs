//! Property-based test generators using proptest.
//!
//! Provides strategies for generating entries and bucket records that
//! always encode successfully.

use burrow_core::{
    Bucket, BucketId, BucketOperation, DataFlag, DataStatus, DataStructure, Entry, EntryMeta,
    TxId,
};
use proptest::prelude::*;

/// Strategy for generating keys.
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Strategy for generating values, mostly small with some that will not
/// fit in a single header-sized read.
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        3 => prop::collection::vec(any::<u8>(), 0..32),
        1 => prop::collection::vec(any::<u8>(), 32..4096),
    ]
}

/// Strategy for generating data flags.
pub fn data_flag_strategy() -> impl Strategy<Value = DataFlag> {
    (0u16..20).prop_map(|v| DataFlag::from_u16(v).expect("Flag in range"))
}

/// Strategy for generating data structure tags.
pub fn data_structure_strategy() -> impl Strategy<Value = DataStructure> {
    prop_oneof![
        Just(DataStructure::Set),
        Just(DataStructure::SortedSet),
        Just(DataStructure::BTree),
        Just(DataStructure::List),
    ]
}

/// Strategy for generating entry metadata across the full range of every
/// field.
pub fn entry_meta_strategy() -> impl Strategy<Value = EntryMeta> {
    (
        any::<u64>(),
        any::<u32>(),
        data_flag_strategy(),
        prop_oneof![Just(DataStatus::Uncommitted), Just(DataStatus::Committed)],
        data_structure_strategy(),
        any::<u64>(),
        any::<u64>(),
    )
        .prop_map(|(timestamp, ttl, flag, status, ds, tx_id, bucket_id)| {
            EntryMeta::new()
                .with_timestamp(timestamp)
                .with_ttl(ttl)
                .with_flag(flag)
                .with_status(status)
                .with_ds(ds)
                .with_tx_id(TxId::new(tx_id))
                .with_bucket_id(BucketId::new(bucket_id))
        })
}

/// Strategy for generating entries.
pub fn entry_strategy() -> impl Strategy<Value = Entry> {
    (key_strategy(), value_strategy(), entry_meta_strategy()).prop_map(|(key, value, meta)| {
        Entry::new(key, value, meta).expect("Generated entry fits")
    })
}

/// Strategy for generating bucket names.
pub fn bucket_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for generating bucket records.
pub fn bucket_strategy() -> impl Strategy<Value = Bucket> {
    (
        prop_oneof![
            Just(BucketOperation::Insert),
            Just(BucketOperation::Update),
            Just(BucketOperation::Delete),
        ],
        any::<u64>(),
        data_structure_strategy(),
        bucket_name_strategy(),
    )
        .prop_map(|(op, id, ds, name)| Bucket::new(op, BucketId::new(id), ds, name))
}
