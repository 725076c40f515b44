//! Heap Walker - single-pass cursor over a region's extents
//!
//! Walker states:
//! ```text
//! ┌───────────┐ remaining == 0 ┌───────────┐ no extent left ┌──────┐
//! │ OnExtent  │ ─────────────▶ │ Advancing │ ─────────────▶ │ Done │
//! └───────────┘ ◀───────────── └───────────┘                └──────┘
//!                 next non-empty
//! ```
//!
//! Each step decodes the object at `extent.base + offset`, measures the
//! heap it occupies and moves the offset past it. The first failure inside
//! an extent yields a [`HeapEntry::Corrupt`] marker and drops the rest of
//! that extent, so one bad object costs at most one extent.

use super::locate::ObjectLocator;
use super::section::Extent;
use super::Heap;
use crate::arraylet::SpineResolver;
use crate::config::HeaderStyle;
use crate::error::{Result, SnapheapError};
use crate::logging::{self, WalkEvent};
use crate::object::HeapObject;
use crate::runtime::RuntimeContext;
use crate::stats::WalkStats;
use crate::util::Alignment;
use std::sync::Arc;
use std::time::Instant;

/// Constants a walk runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkParams {
    pub alignment: u64,
    pub minimum_object_size: u64,
    pub leaf_size: u64,
    pub pointer_size: u64,
    pub header_style: HeaderStyle,
}

impl WalkParams {
    /// Heap bytes an object occupying `occupied` bytes consumes
    ///
    /// Raised to the minimum object size, then rounded up to the alignment.
    pub fn consumed_size(&self, occupied: u64) -> Option<u64> {
        let consumed = occupied.max(self.minimum_object_size);
        consumed.checked_add(Alignment::padding(consumed, self.alignment))
    }
}

/// Marker standing in for an object that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptData {
    /// Address at which decoding failed
    pub address: u64,
    /// Human-readable cause
    pub reason: String,
    /// Underlying decode error
    pub error: SnapheapError,
}

impl CorruptData {
    fn from_error(error: SnapheapError, candidate: u64) -> Self {
        Self {
            address: error.fault_address().unwrap_or(candidate),
            reason: error.to_string(),
            error,
        }
    }
}

/// One item of a heap walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapEntry {
    Object(HeapObject),
    Corrupt(CorruptData),
}

impl HeapEntry {
    /// Decoded object, if this entry is one
    pub fn as_object(&self) -> Option<&HeapObject> {
        match self {
            HeapEntry::Object(object) => Some(object),
            HeapEntry::Corrupt(_) => None,
        }
    }

    /// Whether this entry is a corruption marker
    pub fn is_corrupt(&self) -> bool {
        matches!(self, HeapEntry::Corrupt(_))
    }
}

/// HeapWalker - lazy sequence of the objects in a region
///
/// Borrows the region, so extents cannot be appended mid-walk.
pub struct HeapWalker<'r> {
    region_name: &'r str,
    runtime: &'r dyn RuntimeContext,
    extents: &'r [Extent],
    locator: ObjectLocator<'r>,
    resolver: SpineResolver<'r>,
    params: WalkParams,

    /// Index of the next extent to enter
    next_extent: usize,
    current: Option<Extent>,
    remaining: usize,
    offset: u64,

    stats: WalkStats,
    started: Option<Instant>,
    finished: bool,
}

impl<'r> HeapWalker<'r> {
    /// Create walker
    ///
    /// # Arguments
    /// * `region_name` - Name reported in walk events
    /// * `runtime` - Memory, type catalog and special objects
    /// * `heap` - Heap owning the region
    /// * `extents` - Extents in walk order
    /// * `params` - Region constants
    pub fn new(
        region_name: &'r str,
        runtime: &'r dyn RuntimeContext,
        heap: &'r Arc<Heap>,
        extents: &'r [Extent],
        params: WalkParams,
    ) -> Self {
        Self {
            region_name,
            runtime,
            extents,
            locator: ObjectLocator::new(
                runtime,
                heap,
                params.alignment,
                params.minimum_object_size,
                params.leaf_size,
            ),
            resolver: SpineResolver::new(
                runtime.memory(),
                runtime.type_catalog(),
                params.pointer_size,
                params.leaf_size,
                params.alignment,
            ),
            params,
            next_extent: 0,
            current: None,
            remaining: 0,
            offset: 0,
            stats: WalkStats::new(),
            started: None,
            finished: false,
        }
    }

    /// Statistics of the walk so far
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Constants the walk runs against
    pub fn params(&self) -> &WalkParams {
        &self.params
    }

    /// Move onto the next extent that still holds objects
    fn advance(&mut self) -> bool {
        if self.remaining > 0 {
            return true;
        }

        while let Some(extent) = self.extents.get(self.next_extent).copied() {
            self.next_extent += 1;
            if extent.resident_object_count() == 0 {
                continue;
            }

            log::debug!("Entering {}", extent.name());
            self.current = Some(extent);
            self.remaining = extent.resident_object_count();
            self.offset = 0;
            self.stats.record_extent();
            logging::log_event(WalkEvent::ExtentEntered {
                region: self.region_name.to_string(),
                base: extent.base(),
                size: extent.size(),
                resident_objects: extent.resident_object_count(),
            });
            return true;
        }

        self.current = None;
        false
    }

    /// Decode the object at `address` and measure the heap it consumes
    fn decode(&self, address: u64) -> Result<(HeapObject, u64)> {
        let object = self
            .locator
            .locate(address)?
            .ok_or(SnapheapError::MemoryUnavailable { address })?;

        let catalog = self.runtime.type_catalog();
        let last_in_extent = self.remaining <= 1;
        let mut occupied = self.resolver.space_occupied(&object, last_in_extent)?;

        let flags = catalog
            .header_flags(&object)
            .map_err(|_| SnapheapError::CorruptHeaderFlags { address })?;
        if self.params.header_style.has_been_moved(flags) {
            occupied = occupied
                .checked_add(catalog.hash_slot_size(&object)?)
                .ok_or_else(|| too_large(address))?;
        }

        let consumed = self
            .params
            .consumed_size(occupied)
            .ok_or_else(|| too_large(address))?;

        Ok((object, consumed))
    }

    fn abandon_extent(&mut self, extent: Extent, error: SnapheapError, candidate: u64) -> CorruptData {
        let corrupt = CorruptData::from_error(error, candidate);
        // The failed object itself is reported as the marker
        let skipped_objects = self.remaining.saturating_sub(1);
        self.remaining = 0;
        self.stats.record_corruption();

        log::debug!("Abandoning {}: {}", extent.name(), corrupt.reason);
        logging::log_event(WalkEvent::CorruptObject {
            region: self.region_name.to_string(),
            address: corrupt.address,
            reason: corrupt.reason.clone(),
        });
        logging::log_event(WalkEvent::ExtentAbandoned {
            region: self.region_name.to_string(),
            base: extent.base(),
            skipped_objects,
        });

        corrupt
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        let duration_ms = self
            .started
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        logging::log_event(WalkEvent::WalkComplete {
            region: self.region_name.to_string(),
            duration_ms,
            stats: self.stats,
        });
    }
}

fn too_large(address: u64) -> SnapheapError {
    SnapheapError::CorruptObject {
        address,
        reason: "object size overflows the address space".to_string(),
    }
}

impl Iterator for HeapWalker<'_> {
    type Item = HeapEntry;

    fn next(&mut self) -> Option<HeapEntry> {
        if self.finished {
            return None;
        }
        if self.started.is_none() {
            self.started = Some(Instant::now());
            logging::log_event(WalkEvent::WalkStart {
                region: self.region_name.to_string(),
                extents: self.extents.len(),
            });
        }

        if !self.advance() {
            self.finish();
            return None;
        }
        let extent = self.current?;

        let decoded = extent
            .base()
            .checked_add(self.offset)
            .ok_or(SnapheapError::MemoryUnavailable {
                address: extent.base(),
            })
            .and_then(|address| self.decode(address));

        match decoded {
            Ok((object, consumed)) => {
                self.offset = self.offset.saturating_add(consumed);
                self.remaining -= 1;
                self.stats.record_object(object.is_arraylet(), consumed);
                Some(HeapEntry::Object(object))
            },
            Err(error) => {
                let candidate = extent.base().wrapping_add(self.offset);
                Some(HeapEntry::Corrupt(self.abandon_extent(extent, error, candidate)))
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let pending: usize = self.extents[self.next_extent..]
            .iter()
            .map(Extent::resident_object_count)
            .fold(self.remaining, usize::saturating_add);
        (0, Some(pending))
    }
}

impl std::iter::FusedIterator for HeapWalker<'_> {}
