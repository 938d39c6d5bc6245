//! Core type definitions for Burrow.

use std::fmt;

/// Identifier of a bucket (a named key namespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BucketId(pub u64);

impl BucketId {
    /// Creates a new bucket ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bucket:{}", self.0)
    }
}

/// Identifier of the transaction that wrote an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TxId(pub u64);

impl TxId {
    /// Creates a new transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// TTL value meaning the entry never expires.
pub const PERSISTENT_TTL: u32 = 0;

/// Operation recorded by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum DataFlag {
    /// Delete a key.
    #[default]
    Delete = 0,
    /// Set a key.
    Set = 1,
    /// Push onto the head of a list.
    LPush = 2,
    /// Push onto the tail of a list.
    RPush = 3,
    /// Remove list elements by value.
    LRem = 4,
    /// Pop from the head of a list.
    LPop = 5,
    /// Pop from the tail of a list.
    RPop = 6,
    /// Overwrite a list element.
    LSet = 7,
    /// Trim a list to a range.
    LTrim = 8,
    /// Add a sorted set member.
    ZAdd = 9,
    /// Remove a sorted set member.
    ZRem = 10,
    /// Remove sorted set members by rank.
    ZRemRangeByRank = 11,
    /// Pop the highest scored member.
    ZPopMax = 12,
    /// Pop the lowest scored member.
    ZPopMin = 13,
    /// Drop a set bucket.
    SetBucketDelete = 14,
    /// Drop a sorted set bucket.
    SortedSetBucketDelete = 15,
    /// Drop a B-tree bucket.
    BTreeBucketDelete = 16,
    /// Drop a list bucket.
    ListBucketDelete = 17,
    /// Remove a list element by index.
    LRemByIndex = 18,
    /// Set a TTL on a whole list.
    ExpireList = 19,
}

impl DataFlag {
    /// Converts a wire value to a flag.
    #[must_use]
    pub fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            0 => Self::Delete,
            1 => Self::Set,
            2 => Self::LPush,
            3 => Self::RPush,
            4 => Self::LRem,
            5 => Self::LPop,
            6 => Self::RPop,
            7 => Self::LSet,
            8 => Self::LTrim,
            9 => Self::ZAdd,
            10 => Self::ZRem,
            11 => Self::ZRemRangeByRank,
            12 => Self::ZPopMax,
            13 => Self::ZPopMin,
            14 => Self::SetBucketDelete,
            15 => Self::SortedSetBucketDelete,
            16 => Self::BTreeBucketDelete,
            17 => Self::ListBucketDelete,
            18 => Self::LRemByIndex,
            19 => Self::ExpireList,
            _ => return None,
        })
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Commit status of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum DataStatus {
    /// Written by a transaction that had not committed yet.
    #[default]
    Uncommitted = 0,
    /// Written by a committed transaction.
    Committed = 1,
}

impl DataStatus {
    /// Converts a wire value to a status.
    #[must_use]
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(Self::Uncommitted),
            1 => Some(Self::Committed),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Data structure backing a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum DataStructure {
    /// Unordered set.
    #[default]
    Set = 0,
    /// Scored sorted set.
    SortedSet = 1,
    /// Ordered key-value map.
    BTree = 2,
    /// Doubly ended list.
    List = 3,
}

impl DataStructure {
    /// Converts a wire value to a data structure kind.
    #[must_use]
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(Self::Set),
            1 => Some(Self::SortedSet),
            2 => Some(Self::BTree),
            3 => Some(Self::List),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for DataStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Set => "set",
            Self::SortedSet => "sorted-set",
            Self::BTree => "btree",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

/// Change recorded by a bucket catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BucketOperation {
    /// A bucket was created.
    Insert = 1,
    /// A bucket was renamed or otherwise changed.
    Update = 2,
    /// A bucket was dropped.
    Delete = 3,
}

impl BucketOperation {
    /// Converts a wire value to an operation.
    #[must_use]
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            1 => Some(Self::Insert),
            2 => Some(Self::Update),
            3 => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_flag_roundtrip() {
        for v in 0..=19 {
            let flag = DataFlag::from_u16(v).unwrap();
            assert_eq!(flag.as_u16(), v);
        }
        assert_eq!(DataFlag::from_u16(20), None);
    }

    #[test]
    fn data_structure_roundtrip() {
        for ds in [
            DataStructure::Set,
            DataStructure::SortedSet,
            DataStructure::BTree,
            DataStructure::List,
        ] {
            assert_eq!(DataStructure::from_u16(ds.as_u16()), Some(ds));
        }
        assert_eq!(DataStructure::from_u16(4), None);
    }

    #[test]
    fn bucket_operation_rejects_zero() {
        assert_eq!(BucketOperation::from_u16(0), None);
        assert_eq!(BucketOperation::from_u16(1), Some(BucketOperation::Insert));
    }

    #[test]
    fn bucket_id_display() {
        assert_eq!(format!("{}", BucketId::new(7)), "bucket:7");
    }

    #[test]
    fn zero_values_are_defaults() {
        assert_eq!(DataFlag::default().as_u16(), 0);
        assert_eq!(DataStatus::default().as_u16(), 0);
        assert_eq!(DataStructure::default().as_u16(), 0);
    }
}
