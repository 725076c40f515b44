//! # Snapheap - Heap Walking over Captured Runtime Snapshots
//!
//! Snapheap reconstructs the object layout of a managed heap from a raw
//! memory snapshot. It needs no allocator metadata: a region is described
//! by its byte ranges plus a few layout constants, and the walker recovers
//! object boundaries one after another, sizing each object from its class
//! metadata.
//!
//! ## Quick Start
//!
//! ```rust
//! use snapheap::{
//!     ArrayletIdentification, ByteOrder, HeaderStyle, Heap, HeapObject, HeapRegion,
//!     RegionConfig, SegmentFlags, SnapshotMemory, SnapshotRuntime, TypeCatalog,
//! };
//! use std::sync::Arc;
//!
//! /// Every object is a 24-byte plain object
//! struct FixedSize;
//!
//! impl TypeCatalog for FixedSize {
//!     fn instance_size(&self, _: &HeapObject) -> snapheap::Result<u64> { Ok(24) }
//!     fn first_element_offset(&self, _: &HeapObject) -> snapheap::Result<u64> { Ok(0) }
//!     fn element_type_name(&self, _: &HeapObject) -> snapheap::Result<String> { Ok(String::new()) }
//!     fn header_flags(&self, _: &HeapObject) -> snapheap::Result<u32> { Ok(0) }
//!     fn hash_slot_size(&self, _: &HeapObject) -> snapheap::Result<u64> { Ok(4) }
//! }
//!
//! fn main() -> snapheap::Result<()> {
//!     let mut memory = SnapshotMemory::new(8, ByteOrder::Little);
//!     memory.add_segment(0x1000, vec![0u8; 0x100], SegmentFlags::default())?;
//!
//!     let runtime = SnapshotRuntime::new(Arc::new(memory), Arc::new(FixedSize));
//!     let heap = Arc::new(Heap::new(
//!         "default",
//!         ArrayletIdentification::disabled(),
//!         HeaderStyle::MultiWord,
//!     ));
//!     let mut region = HeapRegion::new(
//!         Arc::new(runtime),
//!         "tenured",
//!         1,
//!         RegionConfig::default(),
//!         heap,
//!         None,
//!     )?;
//!     region.add_extent(0x1000, 0x100, 3)?;
//!
//!     let addresses: Vec<u64> = region
//!         .objects()
//!         .filter_map(|entry| entry.as_object().map(HeapObject::address))
//!         .collect();
//!     assert_eq!(addresses, vec![0x1000, 0x1018, 0x1030]);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       HeapRegion                          │
//! │   extents: [Extent, Extent, ...]   section: Option<..>    │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ objects()
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                       HeapWalker                          │
//! │   ObjectLocator ──▶ ArrayletIdentifier                    │
//! │   SpineResolver ──▶ TypeCatalog + MemoryAccessor          │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//!                             ▼
//!              HeapEntry::Object | HeapEntry::Corrupt
//! ```
//!
//! ### Walk Step
//!
//! 1. **Locate**: check alignment, classify arraylets from the header
//! 2. **Measure**: instance size, or spine size for arraylets
//! 3. **Adjust**: add the hash slot of moved objects
//! 4. **Round**: raise to the minimum object size, pad to the alignment
//! 5. **Advance**: move the cursor past the object
//!
//! A failure in any step yields a corruption marker and the rest of the
//! current extent is skipped.
//!
//! ### Thread Safety
//!
//! - `HeapRegion` is `Send + Sync`; independent walks may run on separate threads
//! - `HeapWalker` is a plain iterator and is not shared between threads
//! - Collaborator traits (`MemoryAccessor`, `TypeCatalog`, `RuntimeContext`) require `Send + Sync`
//!
//! ## Modules
//!
//! - [`arraylet`]: Arraylet identification and spine sizing
//! - [`config`]: Region layout constants and validation
//! - [`error`]: Error types for all snapheap operations
//! - [`heap`]: Regions, sections and the heap walker
//! - [`logging`]: Structured walk events
//! - [`memory`]: Snapshot memory access
//! - [`object`]: Decoded objects and type metadata
//! - [`runtime`]: Runtime context and special objects
//! - [`stats`]: Walk statistics
//! - [`util`]: Utility functions and helpers

// Core
pub mod config;
pub mod error;

// Snapshot decoding
pub mod arraylet;
pub mod heap;
pub mod memory;
pub mod object;
pub mod runtime;

// Monitoring
pub mod logging;
pub mod stats;

// Utilities
pub mod util;

#[cfg(test)]
mod fixtures;

// Re-export main types for convenience
pub use config::{ArrayletIdentification, ConfigError, HeaderStyle, RegionConfig};
pub use error::{Result, SnapheapError};
pub use heap::{
    CorruptData, Extent, Heap, HeapEntry, HeapRegion, HeapSection, HeapWalker, Section, WalkParams,
};
pub use memory::{ByteOrder, MemoryAccessor, SegmentFlags, SnapshotMemory};
pub use object::{HeapObject, TypeCatalog};
pub use runtime::{RuntimeContext, SnapshotRuntime, SpecialObjects};
pub use stats::WalkStats;

/// Snapheap version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
