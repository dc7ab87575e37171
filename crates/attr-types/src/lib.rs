//! Foundation types for the attribute store.
//!
//! This crate provides the key and value types stored by `attr-store`. Every
//! attribute is a pair of an [`Identifier`] and a [`Variant`].
//!
//! # Key Types
//!
//! - [`Identifier`] — 128-bit opaque key, compared only for equality
//! - [`Variant`] — tagged union over the closed set of value kinds
//! - [`VariantKind`] — the tag of a [`Variant`]
//! - [`ObjectRef`] — shared-ownership handle to an external object

pub mod error;
pub mod identifier;
pub mod object;
pub mod variant;

pub use error::TypeError;
pub use identifier::Identifier;
pub use object::ObjectRef;
pub use variant::{Variant, VariantKind};
