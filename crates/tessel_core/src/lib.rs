//! Tessel Engine Core
//!
//! Data-oriented storage shared by every component manager:
//! - Field layout packing for typed multi-field records
//! - Fixed and growable struct-of-arrays / array-of-structs buffers
//! - Phantom-typed instance handles, ranges and sets
//! - Chunked double-ended numeric queue

pub mod config;
pub mod deque;
pub mod instance;
pub mod layout;
pub mod numeric;
pub mod storage;
pub mod store;

pub use config::{GrowthPolicy, StorageConfig};
pub use deque::Deque;
pub use instance::{Instance, InstanceArrayRange, InstanceLinearRange, InstanceRange, InstanceSet};
pub use layout::{pack_fields, PackedLayout, PackingRule, PositionedStructField, StructField};
pub use numeric::{ElementKind, Numeric, NumericType};
pub use storage::{
    ArrayOfStructs, FieldViewsMut, FixedMultiArray, FixedStructArray, Growth, MultiArrayBuffer,
    StorageError, ViewKey,
};
pub use store::ComponentStore;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
