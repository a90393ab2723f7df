//! # Name Hashes and Content Checksums
//!
//! Both fingerprints in a checksum table are XXH3-64:
//!
//! - **`NameHash`** is computed over the UTF-16LE encoding of a
//!   [`CanonicalKey`]. The UTF-16 encoding is part of the table format;
//!   hashing the UTF-8 bytes instead would produce a table no existing
//!   reader can use.
//! - **`content_checksum()`** is computed over the fully decompressed bytes
//!   of a resource.

use std::fmt;

use serde::Serialize;
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

use crate::canonical::CanonicalKey;

/// The 64-bit lookup key of a checksum table row.
///
/// Produced from a `CanonicalKey` via [`NameHash::of()`], or from a raw value
/// read from a serialized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NameHash(pub u64);

impl NameHash {
    /// Hash the UTF-16LE representation of a canonical key.
    pub fn of(key: &CanonicalKey) -> Self {
        let mut hasher = Xxh3::new();
        let mut buf = [0u8; 2];
        for unit in key.as_str().encode_utf16() {
            buf.copy_from_slice(&unit.to_le_bytes());
            hasher.update(&buf);
        }
        Self(hasher.digest())
    }

    /// Access the raw hash value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Compute the 64-bit content checksum of decompressed resource bytes.
pub fn content_checksum(data: &[u8]) -> u64 {
    xxh3_64(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_name_hash_uses_utf16le_bytes() {
        let key = CanonicalKey::new("Data/Item.bgyml");
        assert_eq!(key.name_hash().value(), xxh3_64(&utf16le("Data/Item.bgyml")));
        assert_ne!(key.name_hash().value(), xxh3_64(b"Data/Item.bgyml"));
    }

    #[test]
    fn test_name_hash_non_ascii() {
        let key = CanonicalKey::new("Mals/JPja/\u{30c6}\u{30b9}\u{30c8}.msbt");
        assert_eq!(key.name_hash().value(), xxh3_64(&utf16le(key.as_str())));
    }

    #[test]
    fn test_name_hash_deterministic() {
        let a = CanonicalKey::new("Pack/Actor/Player.pack.zs");
        let b = CanonicalKey::new("Pack/Actor/Player.pack");
        assert_eq!(a.name_hash(), b.name_hash());
    }

    #[test]
    fn test_different_keys_different_hashes() {
        let a = CanonicalKey::new("Data/A.bgyml");
        let b = CanonicalKey::new("Data/B.bgyml");
        assert_ne!(a.name_hash(), b.name_hash());
    }

    #[test]
    fn test_content_checksum_matches_xxh3() {
        assert_eq!(content_checksum(b"vanilla"), xxh3_64(b"vanilla"));
        assert_ne!(content_checksum(b"vanilla"), content_checksum(b"modded"));
    }

    #[test]
    fn test_name_hash_display_is_fixed_width_hex() {
        assert_eq!(NameHash(0xab).to_string(), "00000000000000ab");
    }
}
