//! Unsigned LEB128 varints.
//!
//! Seven data bits per byte, least significant group first; the high bit
//! marks a continuation. A u64 takes at most ten bytes.

/// Maximum encoded length of a u16.
pub const MAX_VARINT_LEN16: usize = 3;

/// Maximum encoded length of a u32.
pub const MAX_VARINT_LEN32: usize = 5;

/// Maximum encoded length of a u64.
pub const MAX_VARINT_LEN64: usize = 10;

/// Why a varint could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// The buffer ended mid-varint.
    Truncated,
    /// The encoding exceeds 64 bits.
    Overflow,
}

/// Appends `value` to `buf`, returning the number of bytes written.
#[allow(clippy::cast_possible_truncation)]
pub fn put_uvarint(buf: &mut Vec<u8>, mut value: u64) -> usize {
    let start = buf.len();
    while value >= 0x80 {
        buf.push(value as u8 | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
    buf.len() - start
}

/// Reads a varint from the front of `buf`, returning `(value, bytes_consumed)`.
pub fn read_uvarint(buf: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN64 {
            return Err(VarintError::Overflow);
        }
        if byte < 0x80 {
            // The tenth byte may only contribute the top bit.
            if i == MAX_VARINT_LEN64 - 1 && byte > 1 {
                return Err(VarintError::Overflow);
            }
            return Ok((value | u64::from(byte) << shift, i + 1));
        }
        value |= u64::from(byte & 0x7F) << shift;
        shift += 7;
    }

    Err(VarintError::Truncated)
}

/// Number of bytes `value` occupies when encoded.
#[must_use]
pub const fn uvarint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        put_uvarint(&mut buf, value);
        buf
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(encode(0), vec![0]);
        assert_eq!(encode(0x7F), vec![0x7F]);
        assert_eq!(read_uvarint(&[0x7F]), Ok((0x7F, 1)));
    }

    #[test]
    fn multi_byte_values() {
        assert_eq!(encode(300), vec![0xAC, 0x02]);
        assert_eq!(read_uvarint(&[0xAC, 0x02, 0xFF]), Ok((300, 2)));
    }

    #[test]
    fn max_lengths() {
        assert_eq!(encode(u64::from(u16::MAX)).len(), MAX_VARINT_LEN16);
        assert_eq!(encode(u64::from(u32::MAX)).len(), MAX_VARINT_LEN32);
        assert_eq!(encode(u64::MAX).len(), MAX_VARINT_LEN64);
        assert_eq!(read_uvarint(&encode(u64::MAX)), Ok((u64::MAX, 10)));
    }

    #[test]
    fn uvarint_len_matches_encoding() {
        for v in [0, 1, 127, 128, 16_383, 16_384, u64::from(u32::MAX), u64::MAX] {
            assert_eq!(uvarint_len(v), encode(v).len());
        }
    }

    #[test]
    fn empty_and_truncated() {
        assert_eq!(read_uvarint(&[]), Err(VarintError::Truncated));
        assert_eq!(read_uvarint(&[0x80, 0x80]), Err(VarintError::Truncated));
    }

    #[test]
    fn overflow() {
        assert_eq!(read_uvarint(&[0xFF; 11]), Err(VarintError::Overflow));
        let mut too_big = vec![0xFF; 9];
        too_big.push(0x02);
        assert_eq!(read_uvarint(&too_big), Err(VarintError::Overflow));
    }
}
