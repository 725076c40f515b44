//! Sections and Extents - byte ranges of a heap region
//!
//! A [`Section`] is an authoritative range taken from the dump's region
//! metadata. An [`Extent`] is a range reconstructed from a contiguous run of
//! objects and also records how many objects live in it; older dump
//! producers omit region bounds, so extents are then the only description
//! available.

use crate::error::{Result, SnapheapError};
use crate::memory::MemoryAccessor;
use serde::{Deserialize, Serialize};

/// Section - contiguous byte range of a heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    base: u64,
    size: u64,
}

impl Section {
    /// Create section
    ///
    /// # Returns
    /// * `Err(SnapheapError::InvalidArgument)` - `base` is null
    pub fn new(base: u64, size: u64) -> Result<Self> {
        crate::ensure!(
            base != 0,
            SnapheapError::InvalidArgument("heap sections cannot have null base pointers".to_string())
        );
        Ok(Self { base, size })
    }

    /// First byte of the section
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Length in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Descriptive name
    pub fn name(&self) -> String {
        format!("Heap extent at {:#x} ({:#x} bytes)", self.base, self.size)
    }
}

/// Extent - section approximated from resident objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    section: Section,
    resident_object_count: usize,
}

impl Extent {
    /// Create extent
    ///
    /// # Returns
    /// * `Err(SnapheapError::InvalidArgument)` - `base` is null
    pub fn new(base: u64, size: u64, resident_object_count: usize) -> Result<Self> {
        Ok(Self {
            section: Section::new(base, size)?,
            resident_object_count,
        })
    }

    /// First byte of the extent
    pub fn base(&self) -> u64 {
        self.section.base
    }

    /// Length in bytes
    pub fn size(&self) -> u64 {
        self.section.size
    }

    /// Number of objects the dump recorded in this extent
    pub fn resident_object_count(&self) -> usize {
        self.resident_object_count
    }

    /// Underlying byte range
    pub fn section(&self) -> Section {
        self.section
    }

    /// Descriptive name
    pub fn name(&self) -> String {
        format!("Heap Extent at {:x} ({} bytes long)", self.base(), self.size())
    }
}

/// HeapSection - one entry reported by [`HeapRegion::sections`](super::HeapRegion::sections)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeapSection {
    Section(Section),
    Extent(Extent),
}

impl HeapSection {
    /// First byte of the range
    pub fn base(&self) -> u64 {
        match self {
            HeapSection::Section(s) => s.base(),
            HeapSection::Extent(e) => e.base(),
        }
    }

    /// Length in bytes
    pub fn size(&self) -> u64 {
        match self {
            HeapSection::Section(s) => s.size(),
            HeapSection::Extent(e) => e.size(),
        }
    }

    /// Descriptive name
    pub fn name(&self) -> String {
        match self {
            HeapSection::Section(s) => s.name(),
            HeapSection::Extent(e) => e.name(),
        }
    }

    /// Whether the base page was executable
    pub fn is_executable(&self, memory: &dyn MemoryAccessor) -> Result<bool> {
        memory.is_executable(self.base())
    }

    /// Whether the base page was read-only
    pub fn is_read_only(&self, memory: &dyn MemoryAccessor) -> Result<bool> {
        memory.is_read_only(self.base())
    }

    /// Whether the base page was shared
    pub fn is_shared(&self, memory: &dyn MemoryAccessor) -> Result<bool> {
        memory.is_shared(self.base())
    }
}
