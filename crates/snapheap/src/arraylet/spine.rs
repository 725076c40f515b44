//! Spine Resolver - heap footprint of decoded objects
//!
//! Plain objects occupy their declared instance size. Arraylets occupy
//! their spine: the header, one pointer slot per leaf, and every leaf that
//! was packed contiguously after the spine.
//!
//! # Zero-length arraylets
//!
//! Producers disagree on whether an empty arraylet carries a (null) leaf
//! pointer slot. When another object follows, the word after the header is
//! probed: a null word, or one pointing exactly where an empty leaf would
//! start, is a leaf slot; anything else is taken to be the next object.
//! The last object of an extent is never probed.
//!
//! # Wide elements
//!
//! With 4-byte object alignment, `double` and `long` leaves still need
//! 8-byte alignment. The spine carries one 4-byte pad, either before the
//! first interior leaf or at the very end.

use crate::error::{Result, SnapheapError};
use crate::memory::MemoryAccessor;
use crate::object::{HeapObject, TypeCatalog};
use crate::util::{is_wide_primitive, Alignment};

/// Leaf arithmetic of one arraylet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafLayout {
    /// Array header size (first element offset)
    pub header_size: u64,
    /// Number of completely filled leaves
    pub full_leaves: u64,
    /// Bytes in the trailing partial leaf, zero if none
    pub tail_size: u64,
    /// Full leaves plus the tail leaf if present
    pub total_leaves: u64,
}

impl LeafLayout {
    /// Split an arraylet's content into leaves
    ///
    /// Returns `None` when the instance is smaller than its header or the
    /// leaf size is zero.
    pub fn new(instance_size: u64, header_size: u64, leaf_size: u64) -> Option<Self> {
        let content_size = instance_size.checked_sub(header_size)?;
        let full_leaves = content_size.checked_div(leaf_size)?;
        let tail_size = content_size % leaf_size;
        let total_leaves = if tail_size == 0 {
            full_leaves
        } else {
            full_leaves + 1
        };

        Some(Self {
            header_size,
            full_leaves,
            tail_size,
            total_leaves,
        })
    }

    /// Length of leaf `index` when stored interior
    pub fn leaf_length(&self, index: u64, leaf_size: u64) -> u64 {
        if index == self.full_leaves {
            self.tail_size
        } else {
            leaf_size
        }
    }
}

/// SpineResolver - computes the bytes an object occupies on the heap
pub struct SpineResolver<'a> {
    memory: &'a dyn MemoryAccessor,
    catalog: &'a dyn TypeCatalog,
    pointer_size: u64,
    leaf_size: u64,
    object_alignment: u64,
}

impl<'a> SpineResolver<'a> {
    /// Create resolver for one region
    ///
    /// # Arguments
    /// * `memory` - Captured address space
    /// * `catalog` - Type metadata
    /// * `pointer_size` - Pointer width of the captured process
    /// * `leaf_size` - Arraylet leaf capacity of the region
    /// * `object_alignment` - Object alignment of the region
    pub fn new(
        memory: &'a dyn MemoryAccessor,
        catalog: &'a dyn TypeCatalog,
        pointer_size: u64,
        leaf_size: u64,
        object_alignment: u64,
    ) -> Self {
        Self {
            memory,
            catalog,
            pointer_size,
            leaf_size,
            object_alignment,
        }
    }

    /// Bytes `object` occupies at its address, before minimum-size and
    /// alignment rounding
    ///
    /// # Arguments
    /// * `object` - Decoded object
    /// * `last_in_extent` - No further object follows in the current extent;
    ///   suppresses the zero-length arraylet probe
    pub fn space_occupied(&self, object: &HeapObject, last_in_extent: bool) -> Result<u64> {
        if object.is_arraylet() {
            self.spine_size(object, last_in_extent)
        } else {
            self.catalog.instance_size(object)
        }
    }

    fn spine_size(&self, object: &HeapObject, last_in_extent: bool) -> Result<u64> {
        let base = object.address();
        let header_size = self.catalog.first_element_offset(object)?;
        let instance_size = self.catalog.instance_size(object)?;
        let layout = LeafLayout::new(instance_size, header_size, self.leaf_size).ok_or_else(|| {
            SnapheapError::CorruptObject {
                address: base,
                reason: format!(
                    "instance size {} is smaller than array header {}",
                    instance_size, header_size
                ),
            }
        })?;
        let wide = is_wide_primitive(&self.catalog.element_type_name(object)?);
        let overflow = || SnapheapError::CorruptObject {
            address: base,
            reason: "arraylet spine extends past the end of the address space".to_string(),
        };

        let mut spine = if layout.total_leaves == 0 {
            if last_in_extent {
                header_size
            } else {
                header_size
                    .checked_add(self.null_leaf_slot(base, header_size, wide)?)
                    .ok_or_else(overflow)?
            }
        } else {
            layout
                .total_leaves
                .checked_mul(self.pointer_size)
                .and_then(|slots| slots.checked_add(header_size))
                .ok_or_else(overflow)?
        };

        let mut expected_leaf = base.checked_add(spine).ok_or_else(overflow)?;
        let mut tail_padding = false;
        if self.object_alignment == 4 && wide && layout.total_leaves > 0 {
            if Alignment::is_aligned(expected_leaf, Alignment::WIDE) {
                tail_padding = true;
            } else {
                expected_leaf = expected_leaf.checked_add(4).ok_or_else(overflow)?;
                spine = spine.checked_add(4).ok_or_else(overflow)?;
                if !Alignment::is_aligned(expected_leaf, Alignment::WIDE) {
                    return Err(SnapheapError::MisalignedArrayletLeaf { address: base });
                }
            }
        }

        for index in 0..layout.total_leaves {
            let slot = index
                .checked_mul(self.pointer_size)
                .and_then(|offset| offset.checked_add(header_size))
                .ok_or_else(overflow)?;
            let leaf = self.memory.read_pointer_at(base, slot)?;
            if leaf == expected_leaf {
                let length = layout.leaf_length(index, self.leaf_size);
                spine = spine.checked_add(length).ok_or_else(overflow)?;
                expected_leaf = expected_leaf.checked_add(length).ok_or_else(overflow)?;
            }
        }

        if tail_padding {
            spine = spine.checked_add(4).ok_or_else(overflow)?;
        }

        Ok(spine)
    }

    /// Probe for a null leaf pointer slot after an empty arraylet's header
    fn null_leaf_slot(&self, base: u64, header_size: u64, wide: bool) -> Result<u64> {
        let peek = self.memory.read_pointer_at(base, header_size)?;
        let distance = if self.pointer_size == 8 || wide {
            8
        } else {
            self.pointer_size
        };
        let possible_leaf = base.wrapping_add(header_size).wrapping_add(distance);

        if peek == possible_leaf || peek == 0 {
            Ok(self.pointer_size)
        } else {
            Ok(0)
        }
    }
}
