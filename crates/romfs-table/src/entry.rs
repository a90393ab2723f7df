//! A single version's fingerprint of a resource.

use serde::{Deserialize, Serialize};

/// Size and checksum of a resource's decompressed bytes as first seen in
/// `version`.
///
/// Rows hold entries in strictly ascending version order, and adjacent
/// entries always differ in `(size, checksum)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumEntry {
    pub version: i32,
    pub size: i32,
    pub checksum: u64,
}

impl ChecksumEntry {
    /// Encoded length in the binary table.
    pub const ENCODED_LEN: usize = 16;

    pub fn new(version: i32, size: i32, checksum: u64) -> Self {
        Self {
            version,
            size,
            checksum,
        }
    }

    /// The `(size, checksum)` pair compared when deduplicating.
    pub fn fingerprint(&self) -> (i32, u64) {
        (self.size, self.checksum)
    }

    /// Whether this entry records the same content as `other`, ignoring
    /// version.
    pub fn same_content(&self, other: &ChecksumEntry) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}
