//! Heap Region - a described region of a captured heap
//!
//! Built once while a snapshot is loaded (constructor plus `add_extent`
//! calls), then treated as read-only. Any number of walks may be started
//! from the same region, including concurrently from several threads.

use super::locate::ObjectLocator;
use super::section::{Extent, HeapSection, Section};
use super::walker::{HeapWalker, WalkParams};
use super::Heap;
use crate::config::RegionConfig;
use crate::error::{Result, SnapheapError};
use crate::object::HeapObject;
use crate::runtime::RuntimeContext;
use std::fmt;
use std::sync::Arc;

/// HeapRegion - byte ranges of one heap region and the constants to decode them
///
/// # Examples
///
/// ```rust,ignore
/// let mut region = HeapRegion::new(runtime, "tenured", 1, RegionConfig::default(), heap, None)?;
/// region.add_extent(0x1000, 64, 2)?;
/// for entry in region.objects() {
///     println!("{:?}", entry);
/// }
/// ```
pub struct HeapRegion {
    runtime: Arc<dyn RuntimeContext>,
    name: String,
    id: u64,
    config: RegionConfig,
    heap: Arc<Heap>,
    section: Option<Section>,
    extents: Vec<Extent>,
}

impl HeapRegion {
    /// Create region
    ///
    /// # Arguments
    /// * `runtime` - Runtime the snapshot was captured from
    /// * `name` - Display name
    /// * `id` - Identifier assigned by the dump producer
    /// * `config` - Layout constants, validated here
    /// * `heap` - Heap owning the region
    /// * `section` - Authoritative bounds, when the dump records them
    ///
    /// # Returns
    /// * `Err(SnapheapError::Configuration)` - Invalid layout constants
    pub fn new(
        runtime: Arc<dyn RuntimeContext>,
        name: impl Into<String>,
        id: u64,
        config: RegionConfig,
        heap: Arc<Heap>,
        section: Option<Section>,
    ) -> Result<Self> {
        config.validate()?;

        let pointer_size = runtime.pointer_size();
        crate::ensure!(
            pointer_size == 4 || pointer_size == 8,
            SnapheapError::InvalidArgument(format!(
                "pointer size must be 4 or 8, got {}",
                pointer_size
            ))
        );

        Ok(Self {
            runtime,
            name: name.into(),
            id,
            config,
            heap,
            section,
            extents: Vec::new(),
        })
    }

    /// Append an extent
    ///
    /// # Returns
    /// * `Err(SnapheapError::InvalidArgument)` - `base` is null
    pub fn add_extent(&mut self, base: u64, size: u64, resident_object_count: usize) -> Result<()> {
        self.extents
            .push(Extent::new(base, size, resident_object_count)?);
        Ok(())
    }

    /// Append an extent spanning `start..end`
    ///
    /// # Returns
    /// * `Err(SnapheapError::InvalidArgument)` - `end < start` or `start` is null
    pub fn add_extent_by_range(&mut self, start: u64, end: u64, resident_object_count: usize) -> Result<()> {
        let size = end.checked_sub(start).ok_or_else(|| {
            SnapheapError::InvalidArgument(format!(
                "extent end {:#x} precedes start {:#x}",
                end, start
            ))
        })?;
        self.add_extent(start, size, resident_object_count)
    }

    /// Byte ranges of the region
    ///
    /// The authoritative section when one is known, otherwise every extent
    /// in insertion order.
    pub fn sections(&self) -> Vec<HeapSection> {
        match self.section {
            Some(section) => vec![HeapSection::Section(section)],
            None => self.extents.iter().copied().map(HeapSection::Extent).collect(),
        }
    }

    /// Walk the objects of every extent appended so far
    pub fn objects(&self) -> HeapWalker<'_> {
        HeapWalker::new(
            &self.name,
            self.runtime.as_ref(),
            &self.heap,
            &self.extents,
            self.walk_params(),
        )
    }

    /// Decode the object at `address`
    ///
    /// # Returns
    /// * `Ok(None)` - `address` is null
    /// * `Err(SnapheapError::InvalidAlignment)` - Misaligned non-null address
    pub fn object_at_address(&self, address: u64) -> Result<Option<HeapObject>> {
        ObjectLocator::new(
            self.runtime.as_ref(),
            &self.heap,
            self.config.object_alignment,
            self.arraylet_spine_size(),
            self.arraylet_leaf_size(),
        )
        .locate(address)
    }

    /// Constants a walk of this region runs against
    pub fn walk_params(&self) -> WalkParams {
        WalkParams {
            alignment: self.config.object_alignment,
            minimum_object_size: self.config.minimum_object_size,
            leaf_size: self.config.arraylet_leaf_size,
            pointer_size: self.runtime.pointer_size(),
            header_style: self.heap.header_style(),
        }
    }

    /// Spine size constant; equals the minimum object size
    pub fn arraylet_spine_size(&self) -> u64 {
        self.config.minimum_object_size
    }

    /// Capacity of one arraylet leaf
    pub fn arraylet_leaf_size(&self) -> u64 {
        self.config.arraylet_leaf_size
    }

    /// Authoritative bounds, if the dump recorded them
    pub fn authoritative_section(&self) -> Option<Section> {
        self.section
    }

    /// Extents in insertion order
    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Producer-assigned identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Layout constants
    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Heap owning the region
    pub fn heap(&self) -> &Arc<Heap> {
        &self.heap
    }

    /// Runtime the region was captured from
    pub fn runtime(&self) -> &dyn RuntimeContext {
        self.runtime.as_ref()
    }
}

impl fmt::Debug for HeapRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapRegion")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("config", &self.config)
            .field("heap", &self.heap.name())
            .field("section", &self.section)
            .field("extents", &self.extents.len())
            .finish()
    }
}
