//! Object Model - Decoded heap objects
//!
//! A [`HeapObject`] is the result of locating an object boundary in a
//! snapshot: where it starts, which heap owns it, and whether its header
//! marks it as an arraylet. Everything about its type (size, element type,
//! header flags) is answered by a [`TypeCatalog`].

pub mod catalog;
pub mod header;

pub use catalog::TypeCatalog;
pub use header::{HAS_BEEN_MOVED_MULTI_WORD, HAS_BEEN_MOVED_SINGLE_WORD};

use crate::heap::Heap;
use std::fmt;
use std::sync::Arc;

/// HeapObject - an object boundary recovered from a snapshot
///
/// Cheap to clone: the owning heap is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapObject {
    address: u64,
    heap: Arc<Heap>,
    arraylet_spine_size: u64,
    arraylet_leaf_size: u64,
    is_arraylet: bool,
    alignment: u64,
}

impl HeapObject {
    /// Create a decoded object
    ///
    /// # Arguments
    /// * `address` - Start of the object in the captured address space
    /// * `heap` - Heap owning the object
    /// * `arraylet_spine_size` - Spine size constant of the owning region
    /// * `arraylet_leaf_size` - Leaf capacity of the owning region
    /// * `is_arraylet` - Arraylet classification of the header
    /// * `alignment` - Object alignment of the owning region
    pub fn new(
        address: u64,
        heap: Arc<Heap>,
        arraylet_spine_size: u64,
        arraylet_leaf_size: u64,
        is_arraylet: bool,
        alignment: u64,
    ) -> Self {
        Self {
            address,
            heap,
            arraylet_spine_size,
            arraylet_leaf_size,
            is_arraylet,
            alignment,
        }
    }

    /// Start address of the object
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Heap owning this object
    pub fn heap(&self) -> &Arc<Heap> {
        &self.heap
    }

    /// Spine size constant of the owning region
    pub fn arraylet_spine_size(&self) -> u64 {
        self.arraylet_spine_size
    }

    /// Leaf capacity of the owning region
    pub fn arraylet_leaf_size(&self) -> u64 {
        self.arraylet_leaf_size
    }

    /// Whether the header classified this object as an arraylet
    pub fn is_arraylet(&self) -> bool {
        self.is_arraylet
    }

    /// Object alignment of the owning region
    pub fn alignment(&self) -> u64 {
        self.alignment
    }
}

impl fmt::Display for HeapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_arraylet { "arraylet" } else { "object" };
        write!(f, "{} at {:#x} in {}", kind, self.address, self.heap.name())
    }
}
