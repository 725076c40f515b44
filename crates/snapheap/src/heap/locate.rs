//! Object Locator - turns candidate addresses into decoded objects

use super::Heap;
use crate::arraylet::ArrayletIdentifier;
use crate::error::{Result, SnapheapError};
use crate::object::HeapObject;
use crate::runtime::RuntimeContext;
use crate::util::Alignment;
use std::sync::Arc;

/// ObjectLocator - address resolution for one region
///
/// Resolution order:
/// 1. Null address: no object
/// 2. Special object registered with the runtime
/// 3. Alignment check, then arraylet identification
pub struct ObjectLocator<'a> {
    runtime: &'a dyn RuntimeContext,
    heap: &'a Arc<Heap>,
    alignment: u64,
    spine_size: u64,
    leaf_size: u64,
    identifier: ArrayletIdentifier,
}

impl<'a> ObjectLocator<'a> {
    /// Create locator
    pub fn new(
        runtime: &'a dyn RuntimeContext,
        heap: &'a Arc<Heap>,
        alignment: u64,
        spine_size: u64,
        leaf_size: u64,
    ) -> Self {
        Self {
            runtime,
            heap,
            alignment,
            spine_size,
            leaf_size,
            identifier: ArrayletIdentifier::new(heap.arraylet_identification()),
        }
    }

    /// Decode the object starting at `address`
    ///
    /// # Returns
    /// * `Ok(None)` - `address` is null
    /// * `Ok(Some(object))` - Decoded or special object
    /// * `Err(SnapheapError::InvalidAlignment)` - Misaligned non-null address
    /// * `Err(SnapheapError::MemoryUnavailable)` - Identification word unreadable
    pub fn locate(&self, address: u64) -> Result<Option<HeapObject>> {
        if address == 0 {
            return Ok(None);
        }

        if let Some(special) = self.runtime.special_object_at(address) {
            return Ok(Some(special));
        }

        if !Alignment::is_aligned(address, self.alignment) {
            return Err(SnapheapError::InvalidAlignment {
                address,
                alignment: self.alignment,
            });
        }

        let is_arraylet = self.identifier.is_arraylet(self.runtime.memory(), address)?;

        Ok(Some(HeapObject::new(
            address,
            Arc::clone(self.heap),
            self.spine_size,
            self.leaf_size,
            is_arraylet,
            self.alignment,
        )))
    }
}
