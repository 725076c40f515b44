//! Alignment Utilities
//!
//! Helper functions for snapshot address alignment.

/// Alignment - utility for alignment operations
///
/// All helpers expect `alignment` to be a non-zero power of two; region
/// constants are validated before they reach these functions.
pub struct Alignment;

impl Alignment {
    /// Align value up to boundary
    ///
    /// # Examples
    /// ```
    /// use snapheap::util::Alignment;
    /// assert_eq!(Alignment::align_up(100, 8), 104);
    /// assert_eq!(Alignment::align_up(64, 8), 64);
    /// ```
    pub fn align_up(value: u64, alignment: u64) -> u64 {
        value + Self::padding(value, alignment)
    }

    /// Check if value is aligned
    pub fn is_aligned(value: u64, alignment: u64) -> bool {
        value & (alignment - 1) == 0
    }

    /// Get alignment padding needed
    ///
    /// Always in `0..alignment`.
    pub fn padding(value: u64, alignment: u64) -> u64 {
        (alignment - value % alignment) % alignment
    }

    /// Wide primitive alignment (8 bytes)
    pub const WIDE: u64 = 8;
}
