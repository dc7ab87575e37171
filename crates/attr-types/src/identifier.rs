use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Opaque 128-bit identifier.
///
/// Identifiers key attributes and may also be stored as attribute values.
/// They carry no ordering: two identifiers are either equal or not, so the
/// type deliberately does not implement `Ord`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(Uuid);

impl Identifier {
    /// Build an identifier from its 128-bit value.
    ///
    /// Usable in `const` items, which is how well-known keys are declared:
    ///
    /// ```
    /// use attr_types::Identifier;
    /// const SHOW_WALLPAPER: Identifier = Identifier::from_u128(0x5c1c_07ad_91e2_4b39_8a6b_3d0f_77e1_0001);
    /// assert!(!SHOW_WALLPAPER.is_nil());
    /// ```
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Build an identifier from 16 raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Generate a fresh identifier (UUID v7).
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// The all-zero identifier.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` if every bit is zero.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The raw 16 bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// The 128-bit value.
    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    /// Hex-encoded string (32 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.as_bytes()[..4])
    }

    /// Parse from a 32-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 16 {
            return Err(TypeError::InvalidLength {
                expected: 16,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_bytes(arr))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.short_hex())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for Identifier {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl From<[u8; 16]> for Identifier {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn const_construction() {
        const KEY: Identifier = Identifier::from_u128(0xdead_beef);
        assert_eq!(KEY.as_u128(), 0xdead_beef);
        assert!(!KEY.is_nil());
    }

    #[test]
    fn nil_is_nil() {
        assert!(Identifier::nil().is_nil());
        assert_eq!(Identifier::nil(), Identifier::from_u128(0));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Identifier::generate();
        let b = Identifier::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn hex_roundtrip() {
        let id = Identifier::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        assert_eq!(id.to_hex(), "0123456789abcdeffedcba9876543210");
        assert_eq!(Identifier::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            Identifier::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert_eq!(
            Identifier::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 16,
                actual: 2
            })
        );
    }

    #[test]
    fn short_hex_is_prefix() {
        let id = Identifier::from_u128(0xaabb_ccdd << 96);
        assert_eq!(id.short_hex(), "aabbccdd");
        assert_eq!(format!("{id:?}"), "Identifier(aabbccdd)");
    }

    #[test]
    fn serde_roundtrip() {
        let id = Identifier::generate();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    proptest! {
        #[test]
        fn bytes_and_u128_agree(value in any::<u128>()) {
            let id = Identifier::from_u128(value);
            prop_assert_eq!(Identifier::from_bytes(*id.as_bytes()), id);
            prop_assert_eq!(id.as_u128(), value);
        }
    }
}
