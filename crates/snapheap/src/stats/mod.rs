//! Stats Module - Heap walk statistics
//!
//! Every walker keeps a [`WalkStats`] record. It is reported in the
//! `WalkComplete` event and can be read at any point through
//! [`HeapWalker::stats`](crate::heap::HeapWalker::stats).

use serde::{Deserialize, Serialize};

/// WalkStats - counters of one heap traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Objects decoded successfully
    pub objects: u64,
    /// Of those, objects classified as arraylets
    pub arraylets: u64,
    /// Corruption markers produced
    pub corrupt_markers: u64,
    /// Extents the cursor entered (empty extents are skipped, not visited)
    pub extents_visited: u64,
    /// Extents whose remaining objects were dropped after a corruption
    pub extents_abandoned: u64,
    /// Heap bytes consumed by decoded objects, padding included
    pub bytes_consumed: u64,
}

impl WalkStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decoded object
    pub fn record_object(&mut self, is_arraylet: bool, consumed: u64) {
        self.objects += 1;
        if is_arraylet {
            self.arraylets += 1;
        }
        self.bytes_consumed = self.bytes_consumed.saturating_add(consumed);
    }

    /// Record a corruption marker and the extent it abandoned
    pub fn record_corruption(&mut self) {
        self.corrupt_markers += 1;
        self.extents_abandoned += 1;
    }

    /// Record entry into a non-empty extent
    pub fn record_extent(&mut self) {
        self.extents_visited += 1;
    }

    /// Entries produced: objects plus corruption markers
    pub fn entries(&self) -> u64 {
        self.objects + self.corrupt_markers
    }

    /// Whether the walk met no corruption
    pub fn is_clean(&self) -> bool {
        self.corrupt_markers == 0
    }
}
