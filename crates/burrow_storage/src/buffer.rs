//! Buffer sizing for recovery scans.

/// One kibibyte.
pub const KB: usize = 1024;

/// One mebibyte.
pub const MB: usize = 1024 * KB;

/// Smallest unit of buffered I/O during recovery.
pub const BLOCK_SIZE: usize = 4 * KB;

/// Maps a requested buffer size to the capacity actually used for the
/// buffered catalog stream.
///
/// - Requests below [`BLOCK_SIZE`] are raised to one block.
/// - Exact multiples of [`BLOCK_SIZE`] get one extra block.
/// - Everything else is used as-is.
///
/// The extra block saturates at `usize::MAX`.
#[must_use]
pub const fn effective_buffer_size(requested: usize) -> usize {
    if requested < BLOCK_SIZE {
        return BLOCK_SIZE;
    }
    if requested % BLOCK_SIZE == 0 {
        return requested.saturating_add(BLOCK_SIZE);
    }
    requested
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_requests_use_one_block() {
        assert_eq!(effective_buffer_size(0), 4096);
        assert_eq!(effective_buffer_size(100), 4096);
        assert_eq!(effective_buffer_size(4095), 4096);
    }

    #[test]
    fn block_multiples_get_an_extra_block() {
        assert_eq!(effective_buffer_size(4096), 8192);
        assert_eq!(effective_buffer_size(8192), 12288);
        assert_eq!(effective_buffer_size(4 * MB), 4 * MB + 4096);
    }

    #[test]
    fn largest_block_multiple_saturates() {
        let top = usize::MAX - (BLOCK_SIZE - 1);
        assert_eq!(top % BLOCK_SIZE, 0);
        assert_eq!(effective_buffer_size(top), usize::MAX);
        assert_eq!(effective_buffer_size(usize::MAX), usize::MAX);
    }

    #[test]
    fn unaligned_requests_are_unchanged() {
        assert_eq!(effective_buffer_size(5000), 5000);
        assert_eq!(effective_buffer_size(4097), 4097);
    }

    proptest! {
        #[test]
        fn never_below_one_block(requested in 0usize..(64 * MB)) {
            let size = effective_buffer_size(requested);
            prop_assert!(size >= BLOCK_SIZE);
            prop_assert!(size >= requested);
            prop_assert!(size - requested <= BLOCK_SIZE);
        }
    }
}
