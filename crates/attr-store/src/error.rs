use attr_types::{Identifier, VariantKind};

/// Errors from attribute store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// No attribute with this key exists.
    #[error("attribute not found: {0}")]
    NotFound(Identifier),

    /// The stored value has a different tag than the one requested.
    #[error("type mismatch for {key}: expected {expected}, found {actual}")]
    TypeMismatch {
        key: Identifier,
        expected: VariantKind,
        actual: VariantKind,
    },

    /// The caller's buffer cannot hold the value. Nothing was written.
    #[error("buffer too small: {required} required, {provided} provided")]
    BufferTooSmall { required: usize, provided: usize },

    /// Enumeration index past the end of the store.
    #[error("index {index} out of range for {count} attributes")]
    IndexOutOfRange { index: usize, count: usize },

    /// The backing storage could not grow.
    #[error("out of memory")]
    OutOfMemory,

    /// The stored object is not of the requested type.
    #[error("object stored at {0} does not have the requested type")]
    NoInterface(Identifier),

    /// `unlock_store` without a matching `lock_store` on this thread.
    #[error("store is not locked by the current thread")]
    NotLocked,

    /// The store configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias for attribute store operations.
pub type AttributeResult<T> = Result<T, AttributeError>;
