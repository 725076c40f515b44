//! Object Header - flag bits the walker interprets
//!
//! Header Flags (relevant bits only):
//! ┌──────────────────────────────────────────────┐
//! │ Multi-word header  : bit 16 = HAS_BEEN_MOVED  │
//! │ Single-word header : bit 2  = HAS_BEEN_MOVED  │
//! └──────────────────────────────────────────────┘
//!
//! An object that was hashed and later relocated by the collector grows a
//! hash slot, so its heap footprint exceeds its declared instance size.

use crate::config::HeaderStyle;

/// HAS_BEEN_MOVED bit for multi-word headers
pub const HAS_BEEN_MOVED_MULTI_WORD: u32 = 0x10000;

/// HAS_BEEN_MOVED bit for single-word headers
pub const HAS_BEEN_MOVED_SINGLE_WORD: u32 = 0x04;

impl HeaderStyle {
    /// Mask of the HAS_BEEN_MOVED bit for this header layout
    #[inline]
    pub fn has_been_moved_mask(self) -> u32 {
        match self {
            HeaderStyle::MultiWord => HAS_BEEN_MOVED_MULTI_WORD,
            HeaderStyle::SingleWord => HAS_BEEN_MOVED_SINGLE_WORD,
        }
    }

    /// Check if header flags mark the object as moved
    #[inline]
    pub fn has_been_moved(self, flags: u32) -> bool {
        let mask = self.has_been_moved_mask();
        flags & mask == mask
    }
}
