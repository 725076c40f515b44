//! Arraylet Identifier
//!
//! Tests a header flags word against the owning heap's identification
//! constants. Heaps that never allocate arraylets carry a zero expected
//! result and are never read.

use crate::config::ArrayletIdentification;
use crate::error::Result;
use crate::memory::MemoryAccessor;

/// ArrayletIdentifier - header-based arraylet classification
#[derive(Debug, Clone, Copy)]
pub struct ArrayletIdentifier {
    identification: ArrayletIdentification,
}

impl ArrayletIdentifier {
    /// Create identifier for a heap's constants
    pub fn new(identification: ArrayletIdentification) -> Self {
        Self { identification }
    }

    /// Classify the object starting at `address`
    ///
    /// # Returns
    /// * `Ok(true)` - Masked flags equal the expected result
    /// * `Ok(false)` - Identification disabled, flags differ, or the
    ///   configured width is neither 4 nor 8
    /// * `Err(SnapheapError::MemoryUnavailable)` - Flags word unreadable
    pub fn is_arraylet(&self, memory: &dyn MemoryAccessor, address: u64) -> Result<bool> {
        let id = &self.identification;
        if !id.is_enabled() {
            return Ok(false);
        }

        let flags = match id.width {
            4 => u64::from(memory.read_u32_at(address, id.offset)?),
            8 => memory.read_u64_at(address, id.offset)?,
            width => {
                // Any other width cannot be read without knowing the dump's endianness
                log::warn!(
                    "Arraylet identification width is invalid: {} (should be 4 or 8)",
                    width
                );
                0
            }
        };

        Ok(id.result == flags & id.bitmask)
    }
}
