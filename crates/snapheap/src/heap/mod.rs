//! Heap Module - Regions, sections and the heap walker
//!
//! A captured heap is described by one or more [`HeapRegion`]s. Each region
//! knows the byte ranges it covers (authoritative [`Section`] or a list of
//! [`Extent`]s with resident object counts) and can walk the objects inside
//! them with a [`HeapWalker`].
//!
//! ```text
//! Heap ──owns──▶ HeapRegion ──extents──▶ [Extent, Extent, ...]
//!                    │
//!                    └── objects() ──▶ HeapWalker ──▶ HeapEntry::Object
//!                                                 └─▶ HeapEntry::Corrupt
//! ```

pub mod locate;
pub mod region;
pub mod section;
pub mod walker;

pub use locate::ObjectLocator;
pub use region::HeapRegion;
pub use section::{Extent, HeapSection, Section};
pub use walker::{CorruptData, HeapEntry, HeapWalker, WalkParams};

use crate::config::{ArrayletIdentification, HeaderStyle};

/// Heap - the heap owning one or more regions
///
/// Carries the constants that are uniform across its regions: how to
/// recognise arraylets and which header layout its objects use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heap {
    name: String,
    identification: ArrayletIdentification,
    header_style: HeaderStyle,
}

impl Heap {
    /// Create heap description
    pub fn new(
        name: impl Into<String>,
        identification: ArrayletIdentification,
        header_style: HeaderStyle,
    ) -> Self {
        Self {
            name: name.into(),
            identification,
            header_style,
        }
    }

    /// Display name of the heap
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arraylet identification constants
    pub fn arraylet_identification(&self) -> ArrayletIdentification {
        self.identification
    }

    /// Object header layout
    pub fn header_style(&self) -> HeaderStyle {
        self.header_style
    }
}
