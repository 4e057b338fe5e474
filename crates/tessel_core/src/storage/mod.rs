// mod.rs - Storage module exports
//
// Packed multi-field buffers: fixed-capacity and growable, in both
// struct-of-arrays and array-of-structs arrangements.

mod array_of_structs;
mod bytes;
mod error;
mod fixed;
mod growable;
mod multi_array;
mod view;

pub use array_of_structs::ArrayOfStructs;
pub use bytes::STORAGE_ALIGNMENT;
pub use error::StorageError;
pub use fixed::{FixedMultiArray, FixedStructArray};
pub use multi_array::MultiArrayBuffer;
pub use view::{FieldViewsMut, Growth, ViewKey};
