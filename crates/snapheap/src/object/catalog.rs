//! Type Catalog - class metadata seen through decoded objects
//!
//! The walker only needs sizes and a few header facts. Field layout, class
//! hierarchy and the rest of the metadata model stay behind this trait.

use super::HeapObject;
use crate::error::Result;

/// Trait answering type questions about decoded objects
///
/// Every method may fail with `MemoryUnavailable` when the class metadata
/// reachable from the object cannot be read.
pub trait TypeCatalog: Send + Sync {
    /// Declared instance size in bytes
    ///
    /// For arrays this includes the header and every element, regardless of
    /// where the elements physically live.
    fn instance_size(&self, object: &HeapObject) -> Result<u64>;

    /// Offset of the first array element, i.e. the array header size
    ///
    /// Does not count arraylet leaf pointers.
    fn first_element_offset(&self, object: &HeapObject) -> Result<u64>;

    /// Name of the array element type (`"double"`, `"long"`, `"int"`, ...)
    fn element_type_name(&self, object: &HeapObject) -> Result<String>;

    /// Raw flags word of the object header
    fn header_flags(&self, object: &HeapObject) -> Result<u32>;

    /// Bytes added to an object that was moved after its hash was taken
    fn hash_slot_size(&self, object: &HeapObject) -> Result<u64>;
}
