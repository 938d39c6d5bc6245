//! Recovery configuration.

use burrow_storage::effective_buffer_size;

/// Configuration for opening a file for recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    /// Requested buffer size for streamed (catalog) reads.
    ///
    /// The size actually used is [`effective_buffer_size`] of this value:
    /// never below one 4 KiB block, and one block larger when it is an
    /// exact multiple of the block size.
    pub buffer_size: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256 * 1024, // 256 KB
        }
    }
}

impl RecoveryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested buffer size.
    #[must_use]
    pub const fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Returns the buffer capacity a file opened with this configuration
    /// will use.
    #[must_use]
    pub const fn effective_buffer_size(&self) -> usize {
        effective_buffer_size(self.buffer_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RecoveryConfig::default();
        assert_eq!(config.buffer_size, 256 * 1024);
        assert_eq!(config.effective_buffer_size(), 256 * 1024 + 4096);
    }

    #[test]
    fn builder_pattern() {
        let config = RecoveryConfig::new().buffer_size(100);
        assert_eq!(config.buffer_size, 100);
        assert_eq!(config.effective_buffer_size(), 4096);

        let config = RecoveryConfig::new().buffer_size(5000);
        assert_eq!(config.effective_buffer_size(), 5000);
    }
}
