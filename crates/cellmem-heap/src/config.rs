//! Heap configuration parameters.

use cellmem_core::{HeapError, HeapResult};

/// Configuration for [`SystemHeap`](crate::SystemHeap).
///
/// Validated at construction; all values are immutable after creation.
/// A handle must be released by a heap built from the same configuration
/// that allocated it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Alignment of every allocation in bytes.
    ///
    /// Default: 16. Must be a power of two and at least the size of a
    /// `usize`. Each block also spends this many bytes on a header that
    /// records its size for release.
    pub alignment: usize,

    /// Zero every new allocation before handing it out.
    ///
    /// Default: `true`.
    pub zero_fill: bool,

    /// Overwrite a block's payload with [`HeapConfig::POISON_BYTE`] before
    /// returning it to the platform.
    ///
    /// Default: `false`. Useful when chasing use-after-free reads in a
    /// debugger.
    pub poison_on_free: bool,
}

impl HeapConfig {
    /// Default allocation alignment in bytes.
    pub const DEFAULT_ALIGNMENT: usize = 16;

    /// Byte written over freed payloads when poisoning is enabled.
    pub const POISON_BYTE: u8 = 0xDD;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            alignment: Self::DEFAULT_ALIGNMENT,
            zero_fill: true,
            poison_on_free: false,
        }
    }

    /// Check that the config describes a usable heap.
    pub fn validate(&self) -> HeapResult<()> {
        if !self.alignment.is_power_of_two() {
            return Err(HeapError::InvalidConfig {
                reason: format!("alignment {} is not a power of two", self.alignment),
            });
        }
        if self.alignment < std::mem::size_of::<usize>() {
            return Err(HeapError::InvalidConfig {
                reason: format!(
                    "alignment {} is smaller than the {}-byte size header",
                    self.alignment,
                    std::mem::size_of::<usize>()
                ),
            });
        }
        Ok(())
    }

    /// Bytes reserved in front of every payload.
    pub fn header_len(&self) -> usize {
        self.alignment
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HeapConfig::default();
        assert_eq!(config.alignment, 16);
        assert!(config.zero_fill);
        assert!(!config.poison_on_free);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_power_of_two_alignment_rejected() {
        let config = HeapConfig {
            alignment: 24,
            ..HeapConfig::new()
        };
        assert!(matches!(
            config.validate(),
            Err(HeapError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn alignment_smaller_than_header_rejected() {
        let config = HeapConfig {
            alignment: 2,
            ..HeapConfig::new()
        };
        assert!(matches!(
            config.validate(),
            Err(HeapError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn header_tracks_alignment() {
        let config = HeapConfig {
            alignment: 64,
            ..HeapConfig::new()
        };
        assert_eq!(config.header_len(), 64);
    }
}
