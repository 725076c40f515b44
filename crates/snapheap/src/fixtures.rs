//! Test fixtures shared by unit tests
//!
//! `ShapeCatalog` answers type questions from a table keyed by object
//! address, so tests control object sizes without encoding class metadata
//! in snapshot bytes.

use crate::config::{ArrayletIdentification, HeaderStyle};
use crate::error::{Result, SnapheapError};
use crate::heap::Heap;
use crate::memory::{ByteOrder, SegmentFlags, SnapshotMemory};
use crate::object::{HeapObject, TypeCatalog};
use std::collections::HashMap;
use std::sync::Arc;

/// Type facts of one object
#[derive(Debug, Clone)]
pub(crate) struct Shape {
    pub instance_size: u64,
    pub header_size: u64,
    pub element: &'static str,
    pub flags: u32,
    pub hash_slot_size: u64,
}

impl Shape {
    pub fn plain(instance_size: u64) -> Self {
        Self {
            instance_size,
            header_size: 0,
            element: "",
            flags: 0,
            hash_slot_size: 4,
        }
    }

    pub fn array(header_size: u64, data_size: u64, element: &'static str) -> Self {
        Self {
            instance_size: header_size + data_size,
            header_size,
            element,
            flags: 0,
            hash_slot_size: 4,
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }
}

/// Catalog keyed by object address
#[derive(Default)]
pub(crate) struct ShapeCatalog {
    shapes: HashMap<u64, Shape>,
    unreadable_flags: Vec<u64>,
}

impl ShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: u64, shape: Shape) {
        self.shapes.insert(address, shape);
    }

    pub fn fail_flags_at(&mut self, address: u64) {
        self.unreadable_flags.push(address);
    }

    fn shape(&self, object: &HeapObject) -> Result<&Shape> {
        self.shapes
            .get(&object.address())
            .ok_or(SnapheapError::MemoryUnavailable {
                address: object.address(),
            })
    }
}

impl TypeCatalog for ShapeCatalog {
    fn instance_size(&self, object: &HeapObject) -> Result<u64> {
        self.shape(object).map(|s| s.instance_size)
    }

    fn first_element_offset(&self, object: &HeapObject) -> Result<u64> {
        self.shape(object).map(|s| s.header_size)
    }

    fn element_type_name(&self, object: &HeapObject) -> Result<String> {
        self.shape(object).map(|s| s.element.to_string())
    }

    fn header_flags(&self, object: &HeapObject) -> Result<u32> {
        if self.unreadable_flags.contains(&object.address()) {
            return Err(SnapheapError::MemoryUnavailable {
                address: object.address(),
            });
        }
        self.shape(object).map(|s| s.flags)
    }

    fn hash_slot_size(&self, object: &HeapObject) -> Result<u64> {
        self.shape(object).map(|s| s.hash_slot_size)
    }
}

pub(crate) fn test_heap(identification: ArrayletIdentification, style: HeaderStyle) -> Arc<Heap> {
    Arc::new(Heap::new("test heap", identification, style))
}

pub(crate) fn test_object(address: u64, is_arraylet: bool, alignment: u64) -> HeapObject {
    let heap = test_heap(ArrayletIdentification::disabled(), HeaderStyle::MultiWord);
    HeapObject::new(address, heap, 16, 64, is_arraylet, alignment)
}

pub(crate) fn test_memory(pointer_size: u64, base: u64, len: usize) -> SnapshotMemory {
    let mut memory = SnapshotMemory::new(pointer_size, ByteOrder::Little);
    memory
        .add_segment(base, vec![0u8; len], SegmentFlags::default())
        .expect("Failed to add fixture segment");
    memory
}
