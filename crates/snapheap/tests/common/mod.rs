//! Test Utilities for the Snapheap Integration Suite
//!
//! Builds synthetic snapshots whose objects carry a small header:
//!
//! ```text
//! offset 0: class id (u32)
//! offset 4: flags    (u32)   bit 0 = arraylet, bit 16 = has been moved
//! offset 8: length   (u32)   arrays only
//! ```
//!
//! [`ClassTable`] answers type questions by reading those words back out of
//! the snapshot, so a damaged header in a test image behaves the way it
//! would in a real dump.

#![allow(dead_code)]

use snapheap::{
    ArrayletIdentification, ByteOrder, HeaderStyle, Heap, HeapEntry, HeapObject, HeapRegion,
    MemoryAccessor, RegionConfig, Result, SegmentFlags, SnapheapError, SnapshotMemory,
    SnapshotRuntime, TypeCatalog,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Arraylet bit of the flags word
pub const ARRAYLET_FLAG: u32 = 0x1;

/// Has-been-moved bit for multi-word headers
pub const MOVED_FLAG: u32 = 0x10000;

/// Hash slot added to moved objects
pub const HASH_SLOT_SIZE: u64 = 4;

/// Identification constants matching [`ARRAYLET_FLAG`]
pub const IDENTIFICATION: ArrayletIdentification = ArrayletIdentification {
    bitmask: ARRAYLET_FLAG as u64,
    result: ARRAYLET_FLAG as u64,
    width: 4,
    offset: 4,
};

/// Shape of one class
#[derive(Debug, Clone)]
pub enum ClassInfo {
    Plain {
        size: u64,
    },
    Array {
        header_size: u64,
        element_size: u64,
        element: &'static str,
    },
}

/// Class table reading headers from snapshot memory
pub struct ClassTable {
    memory: Arc<dyn MemoryAccessor>,
    classes: HashMap<u32, ClassInfo>,
}

impl ClassTable {
    fn class(&self, object: &HeapObject) -> Result<&ClassInfo> {
        let id = self.memory.read_u32_at(object.address(), 0)?;
        self.classes.get(&id).ok_or_else(|| SnapheapError::CorruptObject {
            address: object.address(),
            reason: format!("unknown class id {}", id),
        })
    }
}

impl TypeCatalog for ClassTable {
    fn instance_size(&self, object: &HeapObject) -> Result<u64> {
        match self.class(object)? {
            ClassInfo::Plain { size } => Ok(*size),
            ClassInfo::Array {
                header_size,
                element_size,
                ..
            } => {
                let length = u64::from(self.memory.read_u32_at(object.address(), 8)?);
                Ok(header_size + length * element_size)
            },
        }
    }

    fn first_element_offset(&self, object: &HeapObject) -> Result<u64> {
        match self.class(object)? {
            ClassInfo::Plain { .. } => Ok(0),
            ClassInfo::Array { header_size, .. } => Ok(*header_size),
        }
    }

    fn element_type_name(&self, object: &HeapObject) -> Result<String> {
        match self.class(object)? {
            ClassInfo::Plain { .. } => Ok(String::new()),
            ClassInfo::Array { element, .. } => Ok((*element).to_string()),
        }
    }

    fn header_flags(&self, object: &HeapObject) -> Result<u32> {
        self.memory.read_u32_at(object.address(), 4)
    }

    fn hash_slot_size(&self, _object: &HeapObject) -> Result<u64> {
        Ok(HASH_SLOT_SIZE)
    }
}

/// ============================================================================
/// SNAPSHOT BUILDER
/// ============================================================================

/// Builder for a synthetic snapshot and its class table
pub struct SnapshotBuilder {
    memory: SnapshotMemory,
    classes: HashMap<u32, ClassInfo>,
}

impl SnapshotBuilder {
    /// Create builder with one zeroed segment
    pub fn new(pointer_size: u64, base: u64, len: usize) -> Self {
        let mut memory = SnapshotMemory::new(pointer_size, ByteOrder::Little);
        memory
            .add_segment(base, vec![0u8; len], SegmentFlags::default())
            .expect("fixture segment should be valid");
        Self {
            memory,
            classes: HashMap::new(),
        }
    }

    /// Add another segment
    pub fn segment(mut self, base: u64, len: usize, flags: SegmentFlags) -> Self {
        self.memory
            .add_segment(base, vec![0u8; len], flags)
            .expect("fixture segment should be valid");
        self
    }

    /// Register a class
    pub fn class(mut self, id: u32, info: ClassInfo) -> Self {
        self.classes.insert(id, info);
        self
    }

    /// Write a plain object header
    pub fn object(&mut self, address: u64, class_id: u32, flags: u32) -> &mut Self {
        self.write_u32(address, class_id);
        self.write_u32(address + 4, flags);
        self
    }

    /// Write an array header
    pub fn array(&mut self, address: u64, class_id: u32, length: u32, flags: u32) -> &mut Self {
        self.object(address, class_id, flags);
        self.write_u32(address + 8, length);
        self
    }

    /// Write a pointer-sized word
    pub fn pointer(&mut self, address: u64, value: u64) -> &mut Self {
        self.memory
            .write_pointer(address, value)
            .expect("fixture pointer should be writable");
        self
    }

    pub fn write_u32(&mut self, address: u64, value: u32) -> &mut Self {
        self.memory
            .write_u32(address, value)
            .expect("fixture word should be writable");
        self
    }

    /// Finish the snapshot
    pub fn build(self) -> Arc<SnapshotRuntime> {
        let memory: Arc<dyn MemoryAccessor> = Arc::new(self.memory);
        let catalog = ClassTable {
            memory: Arc::clone(&memory),
            classes: self.classes,
        };
        Arc::new(SnapshotRuntime::new(memory, Arc::new(catalog)))
    }
}

/// ============================================================================
/// REGION HELPERS
/// ============================================================================

/// Heap with arraylet identification on the flags word
pub fn arraylet_heap(style: HeaderStyle) -> Arc<Heap> {
    Arc::new(Heap::new("test heap", IDENTIFICATION, style))
}

/// Region constants
pub fn config(alignment: u64, minimum_object_size: u64, leaf_size: u64) -> RegionConfig {
    RegionConfig {
        object_alignment: alignment,
        minimum_object_size,
        arraylet_leaf_size: leaf_size,
    }
}

/// Region over a built snapshot
pub fn region(runtime: Arc<SnapshotRuntime>, config: RegionConfig, style: HeaderStyle) -> HeapRegion {
    HeapRegion::new(runtime, "test region", 1, config, arraylet_heap(style), None)
        .expect("fixture region should be valid")
}

/// Addresses of every entry, objects and corruption markers alike
pub fn entry_addresses(entries: &[HeapEntry]) -> Vec<u64> {
    entries
        .iter()
        .map(|entry| match entry {
            HeapEntry::Object(object) => object.address(),
            HeapEntry::Corrupt(corrupt) => corrupt.address,
        })
        .collect()
}

/// Assert that `entry` is a corruption marker at `address`
pub fn assert_corrupt_at(entry: &HeapEntry, address: u64) {
    match entry {
        HeapEntry::Corrupt(corrupt) => assert_eq!(
            corrupt.address, address,
            "corruption marker at wrong address: {:?}",
            corrupt
        ),
        HeapEntry::Object(object) => panic!("expected corruption at {:#x}, got {}", address, object),
    }
}
