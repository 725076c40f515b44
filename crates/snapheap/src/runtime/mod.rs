//! Runtime Context - the captured runtime as seen by a heap region
//!
//! A region needs three things from the runtime that owned it:
//! - the captured address space ([`MemoryAccessor`])
//! - the class metadata ([`TypeCatalog`])
//! - the table of special objects that live outside normal decoding
//!
//! [`SnapshotRuntime`] bundles caller-supplied collaborators into a
//! [`RuntimeContext`]; tools with their own registry implement the trait
//! directly.

use crate::memory::MemoryAccessor;
use crate::object::{HeapObject, TypeCatalog};
use indexmap::IndexMap;
use std::sync::Arc;

/// Trait describing the runtime a heap region was captured from
pub trait RuntimeContext: Send + Sync {
    /// Captured address space
    fn memory(&self) -> &dyn MemoryAccessor;

    /// Class metadata of the captured runtime
    fn type_catalog(&self) -> &dyn TypeCatalog;

    /// Pointer width of the captured process
    fn pointer_size(&self) -> u64 {
        self.memory().pointer_size()
    }

    /// Special object registered at `address`, if any
    ///
    /// Special objects bypass alignment checks and arraylet identification.
    fn special_object_at(&self, _address: u64) -> Option<HeapObject> {
        None
    }
}

/// SpecialObjects - address-ordered cache of special objects
///
/// Preserves registration order so reports list special objects the way
/// the loader discovered them.
#[derive(Debug, Default, Clone)]
pub struct SpecialObjects {
    objects: IndexMap<u64, HeapObject>,
}

impl SpecialObjects {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a special object, replacing any previous one at its address
    pub fn insert(&mut self, object: HeapObject) -> Option<HeapObject> {
        self.objects.insert(object.address(), object)
    }

    /// Look up the special object at `address`
    pub fn get(&self, address: u64) -> Option<&HeapObject> {
        self.objects.get(&address)
    }

    /// Number of registered special objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no special objects are registered
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate in registration order
    pub fn iter(&self) -> impl Iterator<Item = &HeapObject> {
        self.objects.values()
    }
}

/// SnapshotRuntime - runtime context assembled from parts
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = SnapshotRuntime::new(memory, catalog);
/// let region = HeapRegion::new(Arc::new(runtime), "tenured", 1, config, heap, None)?;
/// ```
pub struct SnapshotRuntime {
    memory: Arc<dyn MemoryAccessor>,
    catalog: Arc<dyn TypeCatalog>,
    special_objects: SpecialObjects,
}

impl SnapshotRuntime {
    /// Create a runtime with no special objects
    pub fn new(memory: Arc<dyn MemoryAccessor>, catalog: Arc<dyn TypeCatalog>) -> Self {
        Self {
            memory,
            catalog,
            special_objects: SpecialObjects::new(),
        }
    }

    /// Replace the special object table
    pub fn with_special_objects(mut self, special_objects: SpecialObjects) -> Self {
        self.special_objects = special_objects;
        self
    }

    /// Special object table
    pub fn special_objects(&self) -> &SpecialObjects {
        &self.special_objects
    }
}

impl RuntimeContext for SnapshotRuntime {
    fn memory(&self) -> &dyn MemoryAccessor {
        self.memory.as_ref()
    }

    fn type_catalog(&self) -> &dyn TypeCatalog {
        self.catalog.as_ref()
    }

    fn special_object_at(&self, address: u64) -> Option<HeapObject> {
        self.special_objects.get(address).cloned()
    }
}
