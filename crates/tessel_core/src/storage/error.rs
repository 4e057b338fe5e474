use crate::numeric::ElementKind;
use thiserror::Error;

/// Errors a caller can react to, e.g. by allocating larger storage and retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("caller storage holds {provided} bytes but {required} bytes are required")]
    StorageTooSmall { required: usize, provided: usize },

    #[error("caller storage at {address:#x} is not aligned to {alignment} bytes")]
    StorageMisaligned { address: usize, alignment: usize },

    #[error("no field named '{name}'")]
    UnknownField { name: String },

    #[error("field {field} holds {actual} elements but {expected} was requested")]
    FieldTypeMismatch {
        field: usize,
        expected: ElementKind,
        actual: ElementKind,
    },
}
