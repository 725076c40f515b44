//! Configuration Module - Heap Layout Constants
//!
//! A snapshot carries no allocator metadata, so every region is decoded
//! against a handful of layout constants recorded when the dump was taken.
//! This module holds those constants and validates them.

use serde::{Deserialize, Serialize};

/// Per-region layout constants
///
/// # Examples
///
/// ```rust
/// use snapheap::RegionConfig;
///
/// let config = RegionConfig {
///     object_alignment: 8,
///     minimum_object_size: 16,
///     arraylet_leaf_size: 2048,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Boundary every object start must satisfy
    ///
    /// Must be a non-zero power of two.
    /// Default: 8
    pub object_alignment: u64,

    /// Smallest amount of heap any object consumes
    ///
    /// Also reported as the arraylet spine size of the region.
    /// Default: 16
    pub minimum_object_size: u64,

    /// Capacity in bytes of one arraylet leaf
    ///
    /// Default: 2048
    pub arraylet_leaf_size: u64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        RegionConfig {
            object_alignment: 8,
            minimum_object_size: 16,
            arraylet_leaf_size: 2048,
        }
    }
}

impl RegionConfig {
    /// Validate configuration
    ///
    /// Checks that the constants can drive a heap walk without dividing by
    /// zero or producing unaligned cursor positions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.object_alignment.is_power_of_two() {
            return Err(ConfigError::InvalidAlignment(format!(
                "object_alignment must be a non-zero power of two, got {}",
                self.object_alignment
            )));
        }

        if self.minimum_object_size == 0 {
            return Err(ConfigError::InvalidObjectSize(
                "minimum_object_size must be > 0".to_string(),
            ));
        }

        if self.arraylet_leaf_size == 0 {
            return Err(ConfigError::InvalidLeafSize(
                "arraylet_leaf_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Object header layout of a heap
///
/// Selects the bit that marks an object as relocated by a concurrent
/// collector. Captured once when the heap is described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HeaderStyle {
    /// Class pointer and flags live in separate words
    #[default]
    MultiWord,
    /// Flags are packed into the class word
    SingleWord,
}

/// Constants used to recognise arraylets from their header
///
/// An object is an arraylet iff the `width`-byte word at `offset`, masked
/// with `bitmask`, equals `result`. A `result` of zero disables
/// identification entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ArrayletIdentification {
    pub bitmask: u64,
    pub result: u64,
    pub width: u32,
    pub offset: u64,
}

impl ArrayletIdentification {
    /// Identification constants for a heap without arraylets
    pub const fn disabled() -> Self {
        Self {
            bitmask: 0,
            result: 0,
            width: 0,
            offset: 0,
        }
    }

    /// Whether this heap performs arraylet identification at all
    pub fn is_enabled(&self) -> bool {
        self.result != 0
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid object alignment: {0}")]
    InvalidAlignment(String),

    #[error("Invalid minimum object size: {0}")]
    InvalidObjectSize(String),

    #[error("Invalid arraylet leaf size: {0}")]
    InvalidLeafSize(String),
}
