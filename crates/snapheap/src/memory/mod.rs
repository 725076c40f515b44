//! Memory Access - Reading raw bytes out of a snapshot
//!
//! The heap walker never dereferences host pointers. Every byte it looks at
//! comes through a [`MemoryAccessor`], so the same decoding logic runs over
//! an in-memory synthetic image, a memory-mapped dump file, or any other
//! source a tool plugs in.
//!
//! All addresses are addresses in the *captured* process, expressed as
//! `u64` regardless of the host pointer width.

pub mod snapshot;

pub use snapshot::{ByteOrder, SegmentFlags, SnapshotMemory};

use crate::error::{Result, SnapheapError};

/// Trait for reading from a captured address space
///
/// Implementations must be reentrant: several walkers may read through the
/// same accessor from different threads.
pub trait MemoryAccessor: Send + Sync {
    /// Width of a pointer in the captured process (4 or 8)
    fn pointer_size(&self) -> u64;

    /// Fill `buf` with the bytes starting at `address`
    ///
    /// Fails with `MemoryUnavailable` if any byte of the range is missing.
    fn read_bytes(&self, address: u64, buf: &mut [u8]) -> Result<()>;

    /// Read a 32-bit word in the snapshot's byte order
    fn read_u32(&self, address: u64) -> Result<u32>;

    /// Read a 64-bit word in the snapshot's byte order
    fn read_u64(&self, address: u64) -> Result<u64>;

    /// Whether the page holding `address` was executable
    fn is_executable(&self, address: u64) -> Result<bool>;

    /// Whether the page holding `address` was read-only
    fn is_read_only(&self, address: u64) -> Result<bool>;

    /// Whether the page holding `address` was shared
    fn is_shared(&self, address: u64) -> Result<bool>;

    /// Read a pointer-sized word, zero-extended to 64 bits
    fn read_pointer(&self, address: u64) -> Result<u64> {
        match self.pointer_size() {
            4 => self.read_u32(address).map(u64::from),
            _ => self.read_u64(address),
        }
    }

    /// Read a 32-bit word at `address + offset`
    fn read_u32_at(&self, address: u64, offset: u64) -> Result<u32> {
        self.read_u32(offset_address(address, offset)?)
    }

    /// Read a 64-bit word at `address + offset`
    fn read_u64_at(&self, address: u64, offset: u64) -> Result<u64> {
        self.read_u64(offset_address(address, offset)?)
    }

    /// Read a pointer-sized word at `address + offset`
    fn read_pointer_at(&self, address: u64, offset: u64) -> Result<u64> {
        self.read_pointer(offset_address(address, offset)?)
    }
}

/// Compute `address + offset`, treating overflow as an unreadable address
pub fn offset_address(address: u64, offset: u64) -> Result<u64> {
    address
        .checked_add(offset)
        .ok_or(SnapheapError::MemoryUnavailable { address })
}
