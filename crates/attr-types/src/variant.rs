use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;
use crate::object::ObjectRef;

/// The tag of a [`Variant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    Empty,
    Null,
    UInt32,
    UInt64,
    Double,
    Identifier,
    String,
    Blob,
    Object,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Null => write!(f, "null"),
            Self::UInt32 => write!(f, "uint32"),
            Self::UInt64 => write!(f, "uint64"),
            Self::Double => write!(f, "double"),
            Self::Identifier => write!(f, "identifier"),
            Self::String => write!(f, "string"),
            Self::Blob => write!(f, "blob"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// A tagged attribute value.
///
/// Ownership follows the payload type: strings and blobs are owned buffers
/// (cloning deep-copies them), objects are shared handles (cloning takes a
/// new strong reference). Dropping a `Variant` releases what it owns exactly
/// once.
#[derive(Clone, Debug, Default)]
pub enum Variant {
    #[default]
    Empty,
    Null,
    UInt32(u32),
    UInt64(u64),
    Double(f64),
    Identifier(Identifier),
    String(String),
    Blob(Vec<u8>),
    Object(ObjectRef),
}

impl Variant {
    /// The tag of this value.
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::Empty => VariantKind::Empty,
            Self::Null => VariantKind::Null,
            Self::UInt32(_) => VariantKind::UInt32,
            Self::UInt64(_) => VariantKind::UInt64,
            Self::Double(_) => VariantKind::Double,
            Self::Identifier(_) => VariantKind::Identifier,
            Self::String(_) => VariantKind::String,
            Self::Blob(_) => VariantKind::Blob,
            Self::Object(_) => VariantKind::Object,
        }
    }

    /// The `UInt32` payload, or `None` under any other tag.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    /// The `UInt64` payload.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// The `Double` payload.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// The `Identifier` payload.
    pub fn as_identifier(&self) -> Option<Identifier> {
        match self {
            Self::Identifier(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the `String` payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the `Blob` payload.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the `Object` handle without taking a new reference.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Length of a string payload in UTF-16 code units, terminator excluded.
    pub fn wide_len(&self) -> Option<usize> {
        self.as_str().map(|s| s.encode_utf16().count())
    }

    /// Cut a string payload at its first NUL. Other tags pass through.
    ///
    /// Strings are handed out as NUL-terminated buffers, so anything after
    /// an interior NUL could never be observed by a caller.
    pub fn into_terminated(self) -> Self {
        match self {
            Self::String(mut text) => {
                if let Some(end) = text.find('\0') {
                    text.truncate(end);
                }
                Self::String(text)
            }
            other => other,
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) | (Self::Null, Self::Null) => true,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            // Bit-identical doubles compare equal so a stored NaN matches itself.
            (Self::Double(a), Self::Double(b)) => a == b || a.to_bits() == b.to_bits(),
            (Self::Identifier(a), Self::Identifier(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Blob(a), Self::Blob(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Self::UInt32(value)
    }
}

impl From<u64> for Variant {
    fn from(value: u64) -> Self {
        Self::UInt64(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Identifier> for Variant {
    fn from(value: Identifier) -> Self {
        Self::Identifier(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        let end = value.find('\0').unwrap_or(value.len());
        Self::String(value[..end].to_owned())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self::String(value).into_terminated()
    }
}

impl From<&[u8]> for Variant {
    fn from(value: &[u8]) -> Self {
        Self::Blob(value.to_vec())
    }
}

impl From<Vec<u8>> for Variant {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<ObjectRef> for Variant {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl From<&ObjectRef> for Variant {
    fn from(value: &ObjectRef) -> Self {
        Self::Object(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert_eq!(Variant::default().kind(), VariantKind::Empty);
    }

    #[test]
    fn kind_matches_payload() {
        assert_eq!(Variant::Null.kind(), VariantKind::Null);
        assert_eq!(Variant::from(1u32).kind(), VariantKind::UInt32);
        assert_eq!(Variant::from(1u64).kind(), VariantKind::UInt64);
        assert_eq!(Variant::from(1.5).kind(), VariantKind::Double);
        assert_eq!(
            Variant::from(Identifier::nil()).kind(),
            VariantKind::Identifier
        );
        assert_eq!(Variant::from("x").kind(), VariantKind::String);
        assert_eq!(Variant::from(vec![1u8]).kind(), VariantKind::Blob);
        assert_eq!(Variant::from(ObjectRef::new(())).kind(), VariantKind::Object);
    }

    #[test]
    fn accessors_reject_other_tags() {
        let v = Variant::from(7u32);
        assert_eq!(v.as_u32(), Some(7));
        assert_eq!(v.as_u64(), None);
        assert_eq!(v.as_double(), None);
        assert_eq!(v.as_identifier(), None);
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_blob(), None);
        assert!(v.as_object().is_none());
    }

    #[test]
    fn borrowed_input_is_copied() {
        let mut buf = b"pattern".to_vec();
        let v = Variant::from(buf.as_slice());
        buf[0] = b'P';
        assert_eq!(v.as_blob(), Some(&b"pattern"[..]));
    }

    #[test]
    fn clone_is_deep_for_buffers() {
        let a = Variant::from("wine");
        let b = a.clone();
        match (&a, &b) {
            (Variant::String(x), Variant::String(y)) => assert_ne!(x.as_ptr(), y.as_ptr()),
            _ => unreachable!(),
        }
        assert_eq!(a, b);
    }

    #[test]
    fn clone_and_drop_track_object_references() {
        let obj = ObjectRef::new(String::from("brush"));
        let v = Variant::from(&obj);
        assert_eq!(obj.strong_count(), 2);
        let copy = v.clone();
        assert_eq!(obj.strong_count(), 3);
        drop(copy);
        drop(v);
        assert_eq!(obj.strong_count(), 1);
    }

    #[test]
    fn equality_requires_same_tag() {
        assert_ne!(Variant::from(5u32), Variant::from(5u64));
        assert_ne!(Variant::Empty, Variant::Null);
        assert_eq!(Variant::Null, Variant::Null);
    }

    #[test]
    fn double_equality_is_reflexive() {
        let nan = Variant::from(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(Variant::from(0.0), Variant::from(-0.0));
        assert_ne!(Variant::from(1.0), Variant::from(2.0));
    }

    #[test]
    fn object_equality_is_identity() {
        let a = ObjectRef::new(1u32);
        let b = ObjectRef::new(1u32);
        assert_eq!(Variant::from(&a), Variant::from(&a));
        assert_ne!(Variant::from(&a), Variant::from(&b));
    }

    #[test]
    fn wide_len_counts_utf16_units() {
        assert_eq!(Variant::from("wine").wide_len(), Some(4));
        assert_eq!(Variant::from("\u{1F377}").wide_len(), Some(2));
        assert_eq!(Variant::from(1u32).wide_len(), None);
    }

    #[test]
    fn strings_stop_at_first_nul() {
        assert_eq!(Variant::from("a\0b").as_str(), Some("a"));
        assert_eq!(Variant::from(String::from("desk\0top")).as_str(), Some("desk"));
        assert_eq!(Variant::from("\0").wide_len(), Some(0));

        let raw = Variant::String(String::from("x\0y"));
        assert_eq!(raw.wide_len(), Some(3));
        assert_eq!(raw.into_terminated().as_str(), Some("x"));
        assert_eq!(Variant::from(3u32).into_terminated(), Variant::from(3u32));
    }

    #[test]
    fn kind_display() {
        assert_eq!(VariantKind::UInt32.to_string(), "uint32");
        assert_eq!(VariantKind::Object.to_string(), "object");
    }
}
