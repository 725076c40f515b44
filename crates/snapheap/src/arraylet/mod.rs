//! Arraylets - segmented arrays on the heap
//!
//! A large array is stored as a *spine* (header plus one pointer per leaf)
//! and fixed-capacity *leaves*. Leaves may sit anywhere in the heap
//! (exterior) or be packed immediately after the spine (interior); only
//! interior leaves count towards the spine's footprint when walking.
//!
//! ```text
//! ┌────────┬──────┬──────┬─────────────┬────────────┐
//! │ header │ ptr0 │ ptr1 │ leaf0 (int) │ tail (int) │   spine = all of it
//! └────────┴──┬───┴──┬───┴─────────────┴────────────┘
//!             │      └──────────────────────▲
//!             └──────────▲
//! ```
//!
//! - [`ArrayletIdentifier`]: classifies an address from its header flags
//! - [`SpineResolver`]: computes the heap bytes a decoded object occupies

pub mod identify;
pub mod spine;

pub use identify::ArrayletIdentifier;
pub use spine::{LeafLayout, SpineResolver};
