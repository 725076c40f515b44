//! Error Module - Snapheap Error Types
//!
//! Defines all error types used while decoding a heap snapshot.
//!
//! # Error Categories
//!
//! ## Decode Errors
//! - `InvalidAlignment` - Candidate object address violates region alignment
//! - `MemoryUnavailable` - Snapshot has no readable bytes at an address
//! - `CorruptHeaderFlags` - Object header flags could not be read
//! - `MisalignedArrayletLeaf` - Wide-element arraylet leaf cannot be 8-byte aligned
//! - `CorruptObject` - Object metadata is self-contradictory
//!
//! ## Construction Errors
//! - `InvalidArgument` - Contract violation at region build time
//! - `SnapshotIo` - Snapshot image file could not be mapped
//! - `Configuration` - Invalid region constants
//!
//! Decode errors raised inside a heap walk never escape the walker; they are
//! converted into [`CorruptData`](crate::heap::CorruptData) entries.

use thiserror::Error;

/// Main error type for all snapheap operations
///
/// # Examples
///
/// ```rust
/// use snapheap::SnapheapError;
///
/// fn describe(err: &SnapheapError) -> String {
///     match err {
///         SnapheapError::MemoryUnavailable { address } => {
///             format!("nothing mapped at {:#x}", address)
///         }
///         other => other.to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapheapError {
    /// Address is not a multiple of the region's object alignment
    ///
    /// **When returned:** `object_at_address` on a misaligned, non-zero address
    ///
    /// **Recovery strategy:** Inside a walk, the rest of the extent is abandoned
    #[error("Invalid alignment for object at {address:#x}: should be {alignment} aligned")]
    InvalidAlignment { address: u64, alignment: u64 },

    /// Snapshot bytes are missing or unreadable
    ///
    /// **When returned:** Any read that falls outside the captured segments
    ///
    /// **Recovery strategy:** Mark the object corrupt and move to the next extent
    #[error("Memory unavailable at {address:#x}")]
    MemoryUnavailable { address: u64 },

    /// Header flags of an object could not be read
    #[error("Flags in object header unreadable at {address:#x}")]
    CorruptHeaderFlags { address: u64 },

    /// Interior leaf of a wide-element arraylet cannot be placed on an 8-byte boundary
    ///
    /// Only a corrupt spine produces this: with 4-byte object alignment one
    /// 4-byte pad always suffices.
    #[error("Arraylet leaf pointer misaligned for object at {address:#x}")]
    MisalignedArrayletLeaf { address: u64 },

    /// Object metadata contradicts itself (e.g. instance smaller than its header)
    #[error("Corrupt object at {address:#x}: {reason}")]
    CorruptObject { address: u64, reason: String },

    /// Invalid argument
    ///
    /// **When returned:** Construction-time contract violation
    ///
    /// **Example scenarios:**
    /// - Section or extent with a null base address
    /// - Extent range whose end precedes its start
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Snapshot image could not be opened or mapped
    #[error("Snapshot I/O error: {0}")]
    SnapshotIo(String),

    /// Configuration error
    ///
    /// **When returned:** Region constants fail validation
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SnapheapError {
    /// Check if this error describes damaged snapshot data rather than caller misuse
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SnapheapError::InvalidAlignment { .. }
                | SnapheapError::MemoryUnavailable { .. }
                | SnapheapError::CorruptHeaderFlags { .. }
                | SnapheapError::MisalignedArrayletLeaf { .. }
                | SnapheapError::CorruptObject { .. }
        )
    }

    /// Address at which decoding failed, if the error carries one
    pub fn fault_address(&self) -> Option<u64> {
        match self {
            SnapheapError::InvalidAlignment { address, .. }
            | SnapheapError::MemoryUnavailable { address }
            | SnapheapError::CorruptHeaderFlags { address }
            | SnapheapError::MisalignedArrayletLeaf { address }
            | SnapheapError::CorruptObject { address, .. } => Some(*address),
            SnapheapError::InvalidArgument(_)
            | SnapheapError::SnapshotIo(_)
            | SnapheapError::Configuration(_) => None,
        }
    }
}

impl From<crate::config::ConfigError> for SnapheapError {
    fn from(err: crate::config::ConfigError) -> Self {
        SnapheapError::Configuration(err.to_string())
    }
}

/// Result type alias for snapheap operations
pub type Result<T> = std::result::Result<T, SnapheapError>;

/// Ensure condition is true, otherwise return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
