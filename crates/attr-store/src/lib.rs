//! Thread-safe in-memory attribute store.
//!
//! An [`AttributeStore`] maps opaque [`Identifier`] keys to typed
//! [`Variant`] values. Attributes keep their insertion order, so a store can
//! be enumerated by index, and two stores can be compared structurally under
//! a [`MatchType`].
//!
//! # Design Rules
//!
//! 1. Keys are unique. Setting an existing key replaces its value in place.
//! 2. Values are owned by the store. Strings and blobs are copied in and out;
//!    objects are held as one strong reference per stored value.
//! 3. Every replaced or deleted value is released exactly once.
//! 4. Every operation runs under the store's reentrant lock. Callers compose
//!    atomic sequences with [`AttributeStore::lock`] or
//!    [`AttributeStore::lock_store`] / [`AttributeStore::unlock_store`].
//! 5. A failed operation leaves the store unchanged.
//! 6. Errors go back to the caller; the store never logs or retries them.

pub mod array;
pub mod compare;
pub mod config;
pub mod error;
pub mod lock;
pub mod store;
pub mod typed;

// Re-export primary types at crate root for ergonomic imports.
pub use array::{Attribute, AttributeArray};
pub use attr_types::{Identifier, ObjectRef, Variant, VariantKind};
pub use compare::MatchType;
pub use config::StoreConfig;
pub use error::{AttributeError, AttributeResult};
pub use lock::StoreLock;
pub use store::AttributeStore;
