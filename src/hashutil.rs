//! Hash Primitives
//!
//! Double-SHA-256 and the two hash byte orders used throughout this crate.
//! `InternalHash` is wire/hash order (little-endian, the order every map key
//! and every hashing input uses). `DisplayHash` is the byte-reversed form
//! shown to users (block explorer strings, the HTTP query surface). The two
//! are distinct types on purpose: nothing converts between them implicitly,
//! so a hash read for display can never end up as a map key by accident.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

fn dsha256_raw(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Double SHA-256 of arbitrary bytes.
pub fn dsha256(data: &[u8]) -> InternalHash {
    InternalHash(dsha256_raw(data))
}

/// Double SHA-256 of two concatenated hashes, the Merkle pairing step.
pub fn dsha256_pair(left: &InternalHash, right: &InternalHash) -> InternalHash {
    let mut combined = [0u8; 64];
    combined[0..32].copy_from_slice(&left.0);
    combined[32..64].copy_from_slice(&right.0);
    dsha256(&combined)
}

/// A 32-byte hash in internal (wire/hashing) byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternalHash(pub [u8; 32]);

/// A 32-byte hash in display (user-facing) byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayHash(pub [u8; 32]);

/// The all-zero sentinel standing in for the genesis block's non-existent parent.
pub const SENTINEL: InternalHash = InternalHash([0u8; 32]);

impl InternalHash {
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Self(out)
    }

    pub fn to_display(self) -> DisplayHash {
        let mut out = self.0;
        out.reverse();
        DisplayHash(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl DisplayHash {
    pub fn to_internal(self) -> InternalHash {
        let mut out = self.0;
        out.reverse();
        InternalHash(out)
    }

    /// Parse a 64-character hex string as a display-order hash.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for InternalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Display for DisplayHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Hashes serialize as hex strings, never raw byte arrays, so the proof
/// JSON body matches the wire contract of §4.11 instead of leaking an
/// implementation-specific array encoding.
impl Serialize for InternalHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InternalHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom("expected 32-byte hash"));
        }
        Ok(InternalHash::from_slice(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dsha256_matches_double_application() {
        let data = b"hello";
        let once = Sha256::digest(data);
        let twice: [u8; 32] = Sha256::digest(once).into();
        assert_eq!(dsha256(data).0, twice);
    }

    #[test]
    fn display_internal_roundtrip() {
        let internal = InternalHash([1u8; 32]);
        let display = internal.to_display();
        assert_eq!(display.to_internal(), internal);
        assert_ne!(display.0, internal.0);
    }

    #[test]
    fn sentinel_is_all_zero() {
        assert_eq!(SENTINEL.0, [0u8; 32]);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(DisplayHash::from_hex("aabb").is_err());
    }
}
