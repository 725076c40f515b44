//! Util Module - Shared Utilities
//!
//! Utilities and helper functions used throughout snapheap.

pub mod alignment;
pub mod debug;

pub use alignment::Alignment;
pub use debug::format_address;

/// Element type names whose arraylet leaves need 8-byte alignment
pub const WIDE_PRIMITIVES: [&str; 2] = ["double", "long"];

/// Whether an array element type is an 8-byte primitive
pub fn is_wide_primitive(type_name: &str) -> bool {
    WIDE_PRIMITIVES.contains(&type_name)
}
