//! # Checksum Table
//!
//! The query-time model: name hash to version history, immutable after
//! construction. Every constructor validates the row invariants, so lookups
//! can rely on them without re-checking.

use std::collections::HashMap;

use romfs_core::{CanonicalKey, NameHash};

use crate::entry::ChecksumEntry;
use crate::error::TableError;

/// Pick the entry of `row` that applies to `version`.
///
/// That is the entry with the greatest version not above `version`. When
/// `version` predates every entry the earliest entry is returned, so a
/// resource first recorded in a later release still has a baseline.
/// `row` must be sorted ascending by version.
pub fn select_entry(row: &[ChecksumEntry], version: i32) -> Option<&ChecksumEntry> {
    match row.partition_point(|entry| entry.version <= version) {
        0 => row.first(),
        n => row.get(n - 1),
    }
}

/// A loaded, read-only checksum table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumTable {
    base_version: i32,
    rows: HashMap<NameHash, Vec<ChecksumEntry>>,
}

impl ChecksumTable {
    /// Build a table from rows, validating that no hash repeats, no row is
    /// empty, and versions within a row are strictly ascending.
    pub fn from_rows<I>(base_version: i32, rows: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (NameHash, Vec<ChecksumEntry>)>,
    {
        let rows = rows.into_iter();
        let mut map = HashMap::with_capacity(rows.size_hint().0);
        for (hash, entries) in rows {
            validate_row(hash, &entries)?;
            if map.insert(hash, entries).is_some() {
                return Err(TableError::DuplicateRow(hash));
            }
        }
        Ok(Self {
            base_version,
            rows: map,
        })
    }

    /// Version of the first asset root the table was built from.
    pub fn base_version(&self) -> i32 {
        self.base_version
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every entry recorded for a name hash, ascending by version.
    pub fn row(&self, hash: NameHash) -> Option<&[ChecksumEntry]> {
        self.rows.get(&hash).map(Vec::as_slice)
    }

    /// The entry that applies to `key` in `version`. See [`select_entry`].
    pub fn lookup(&self, key: &CanonicalKey, version: i32) -> Option<&ChecksumEntry> {
        self.lookup_hash(key.name_hash(), version)
    }

    /// Like [`lookup`](Self::lookup) for a precomputed hash.
    pub fn lookup_hash(&self, hash: NameHash, version: i32) -> Option<&ChecksumEntry> {
        self.rows
            .get(&hash)
            .and_then(|row| select_entry(row, version))
    }

    /// Iterate rows in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (NameHash, &[ChecksumEntry])> + '_ {
        self.rows.iter().map(|(hash, row)| (*hash, row.as_slice()))
    }

    /// Rows sorted ascending by name hash.
    pub fn sorted_rows(&self) -> Vec<(NameHash, &[ChecksumEntry])> {
        let mut rows: Vec<_> = self.iter().collect();
        rows.sort_unstable_by_key(|(hash, _)| *hash);
        rows
    }

    /// Total number of entries across all rows.
    pub fn entry_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

pub(crate) fn validate_row(hash: NameHash, entries: &[ChecksumEntry]) -> Result<(), TableError> {
    if entries.is_empty() {
        return Err(TableError::EmptyRow(hash));
    }
    for pair in entries.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(TableError::UnorderedVersions {
                hash,
                previous: pair[0].version,
                next: pair[1].version,
            });
        }
    }
    Ok(())
}
