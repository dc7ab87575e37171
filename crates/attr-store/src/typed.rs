//! Typed accessors.
//!
//! Getters fail with [`AttributeError::NotFound`] when the key is absent and
//! [`AttributeError::TypeMismatch`] when the stored tag differs from the one
//! requested. String and blob getters that fill a caller buffer follow a
//! two-call contract: an undersized buffer (an empty one included) fails
//! with [`AttributeError::BufferTooSmall`] carrying the required size, and
//! nothing is written.

use std::any::Any;
use std::sync::Arc;

use attr_types::{Identifier, ObjectRef, Variant, VariantKind};

use crate::error::{AttributeError, AttributeResult};
use crate::store::AttributeStore;

fn pack(high: u32, low: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}

fn unpack(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}

impl AttributeStore {
    fn get_typed<T>(
        &self,
        key: Identifier,
        expected: VariantKind,
        extract: impl FnOnce(&Variant) -> Option<T>,
    ) -> AttributeResult<T> {
        self.read(|array| {
            let value = array.get(&key).ok_or(AttributeError::NotFound(key))?;
            extract(value).ok_or(AttributeError::TypeMismatch {
                key,
                expected,
                actual: value.kind(),
            })
        })
    }

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    /// Value of a `UInt32` attribute.
    pub fn get_u32(&self, key: Identifier) -> AttributeResult<u32> {
        self.get_typed(key, VariantKind::UInt32, Variant::as_u32)
    }

    /// Value of a `UInt64` attribute.
    pub fn get_u64(&self, key: Identifier) -> AttributeResult<u64> {
        self.get_typed(key, VariantKind::UInt64, Variant::as_u64)
    }

    /// Value of a `Double` attribute.
    pub fn get_double(&self, key: Identifier) -> AttributeResult<f64> {
        self.get_typed(key, VariantKind::Double, Variant::as_double)
    }

    /// Value of an `Identifier` attribute.
    pub fn get_identifier(&self, key: Identifier) -> AttributeResult<Identifier> {
        self.get_typed(key, VariantKind::Identifier, Variant::as_identifier)
    }

    /// Store a `UInt32` under `key`.
    pub fn set_u32(&self, key: Identifier, value: u32) -> AttributeResult<()> {
        self.set_item(key, Variant::UInt32(value))
    }

    /// Store a `UInt64` under `key`.
    pub fn set_u64(&self, key: Identifier, value: u64) -> AttributeResult<()> {
        self.set_item(key, Variant::UInt64(value))
    }

    /// Store a `Double` under `key`.
    pub fn set_double(&self, key: Identifier, value: f64) -> AttributeResult<()> {
        self.set_item(key, Variant::Double(value))
    }

    /// Store an `Identifier` value under `key`.
    pub fn set_identifier(&self, key: Identifier, value: Identifier) -> AttributeResult<()> {
        self.set_item(key, Variant::Identifier(value))
    }

    /// `get_u32`, with `default` substituted when the key is absent.
    ///
    /// A stored value of another type is still a `TypeMismatch`.
    pub fn get_u32_or(&self, key: Identifier, default: u32) -> AttributeResult<u32> {
        match self.get_u32(key) {
            Err(AttributeError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    /// `get_u64`, with `default` substituted when the key is absent.
    pub fn get_u64_or(&self, key: Identifier, default: u64) -> AttributeResult<u64> {
        match self.get_u64(key) {
            Err(AttributeError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    /// `get_double`, with `default` substituted when the key is absent.
    pub fn get_double_or(&self, key: Identifier, default: f64) -> AttributeResult<f64> {
        match self.get_double(key) {
            Err(AttributeError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    // -----------------------------------------------------------------------
    // Packed pairs
    // -----------------------------------------------------------------------

    /// Store a width/height pair in one `UInt64` (width in the high word).
    pub fn set_size(&self, key: Identifier, width: u32, height: u32) -> AttributeResult<()> {
        self.set_u64(key, pack(width, height))
    }

    /// Width/height pair stored with [`set_size`](Self::set_size).
    pub fn get_size(&self, key: Identifier) -> AttributeResult<(u32, u32)> {
        self.get_u64(key).map(unpack)
    }

    /// Store a numerator/denominator pair in one `UInt64` (numerator in the
    /// high word).
    pub fn set_ratio(
        &self,
        key: Identifier,
        numerator: u32,
        denominator: u32,
    ) -> AttributeResult<()> {
        self.set_u64(key, pack(numerator, denominator))
    }

    /// Numerator/denominator pair stored with [`set_ratio`](Self::set_ratio).
    pub fn get_ratio(&self, key: Identifier) -> AttributeResult<(u32, u32)> {
        self.get_u64(key).map(unpack)
    }

    // -----------------------------------------------------------------------
    // Strings
    // -----------------------------------------------------------------------

    /// Length of a string attribute in UTF-16 code units, terminator excluded.
    pub fn get_string_length(&self, key: Identifier) -> AttributeResult<usize> {
        self.get_typed(key, VariantKind::String, Variant::wide_len)
    }

    /// Copy a string attribute into `buf` as terminated UTF-16.
    ///
    /// `buf` must hold the string plus one terminator unit. Returns the
    /// length written, terminator excluded.
    pub fn get_string(&self, key: Identifier, buf: &mut [u16]) -> AttributeResult<usize> {
        self.get_typed(key, VariantKind::String, |value| {
            let text = value.as_str()?;
            let required = text.encode_utf16().count() + 1;
            if buf.len() < required {
                return Some(Err(AttributeError::BufferTooSmall {
                    required,
                    provided: buf.len(),
                }));
            }
            for (slot, unit) in buf.iter_mut().zip(text.encode_utf16()) {
                *slot = unit;
            }
            buf[required - 1] = 0;
            Some(Ok(required - 1))
        })?
    }

    /// Owned copy of a string attribute.
    pub fn get_allocated_string(&self, key: Identifier) -> AttributeResult<String> {
        self.get_typed(key, VariantKind::String, |value| {
            value.as_str().map(str::to_owned)
        })
    }

    /// Store a copy of `value`, up to its first NUL.
    pub fn set_string(&self, key: Identifier, value: &str) -> AttributeResult<()> {
        self.set_item(key, Variant::from(value))
    }

    // -----------------------------------------------------------------------
    // Blobs
    // -----------------------------------------------------------------------

    /// Size of a blob attribute in bytes.
    pub fn get_blob_size(&self, key: Identifier) -> AttributeResult<usize> {
        self.get_typed(key, VariantKind::Blob, |value| value.as_blob().map(<[u8]>::len))
    }

    /// Copy a blob attribute into the front of `buf`. Returns the blob size.
    pub fn get_blob(&self, key: Identifier, buf: &mut [u8]) -> AttributeResult<usize> {
        self.get_typed(key, VariantKind::Blob, |value| {
            let blob = value.as_blob()?;
            if buf.len() < blob.len() {
                return Some(Err(AttributeError::BufferTooSmall {
                    required: blob.len(),
                    provided: buf.len(),
                }));
            }
            buf[..blob.len()].copy_from_slice(blob);
            Some(Ok(blob.len()))
        })?
    }

    /// Owned copy of a blob attribute.
    pub fn get_allocated_blob(&self, key: Identifier) -> AttributeResult<Vec<u8>> {
        self.get_typed(key, VariantKind::Blob, |value| value.as_blob().map(<[u8]>::to_vec))
    }

    /// Store a copy of `value`.
    pub fn set_blob(&self, key: Identifier, value: &[u8]) -> AttributeResult<()> {
        self.set_item(key, Variant::Blob(value.to_vec()))
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// A new strong reference to an object attribute.
    pub fn get_object(&self, key: Identifier) -> AttributeResult<ObjectRef> {
        self.get_typed(key, VariantKind::Object, |value| value.as_object().cloned())
    }

    /// A new strong reference to an object attribute of type `T`.
    ///
    /// Fails with [`AttributeError::NoInterface`] if the object is some
    /// other type.
    pub fn get_object_as<T: Any + Send + Sync>(&self, key: Identifier) -> AttributeResult<Arc<T>> {
        self.get_object(key)?
            .downcast::<T>()
            .ok_or(AttributeError::NoInterface(key))
    }

    /// Store a new strong reference to `object`.
    pub fn set_object(&self, key: Identifier, object: &ObjectRef) -> AttributeResult<()> {
        self.set_item(key, Variant::Object(object.clone()))
    }
}
