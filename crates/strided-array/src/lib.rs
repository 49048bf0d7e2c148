//! strided-array - Owning arrays and borrowing views over strided-core
//! shapes
//!
//! Storage is attached to a shape either by allocation ([`Array`]) or by
//! borrowing caller-managed memory ([`ArrayView`]/[`ArrayViewMut`]); both
//! address elements through the shape's flat offsets, so sparse, cropped,
//! transposed, and broadcast layouts all go through the same code paths.

mod algorithm;
mod array;
mod buffer;
mod view;

pub use algorithm::{copy, equal, fill, fill_with, move_into};
pub use array::Array;
pub use view::{ArrayView, ArrayViewMut, IndexSpec};
