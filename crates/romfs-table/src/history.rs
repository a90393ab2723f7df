//! # Version History
//!
//! The build-time model of a checksum table. Rows are keyed by the
//! readable [`CanonicalKey`] rather than its hash, which keeps the debug
//! dump legible and lets [`VersionHistory::to_table`] detect name-hash
//! collisions before they reach the binary artifact.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use romfs_core::{CanonicalKey, NameHash};
use serde::Serialize;

use crate::entry::ChecksumEntry;
use crate::error::TableError;
use crate::table::ChecksumTable;

/// Counts from merging one asset root into a history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Keys seen for the first time.
    pub added: usize,
    /// Existing keys whose content changed.
    pub changed: usize,
    /// Existing keys whose content matched their latest entry.
    pub unchanged: usize,
}

/// Canonical key to ascending, deduplicated version entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionHistory {
    rows: BTreeMap<CanonicalKey, Vec<ChecksumEntry>>,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation. Returns `true` if an entry was appended and
    /// `false` if it matched the row's latest content.
    ///
    /// # Errors
    ///
    /// `TableError::UnorderedVersions` if `entry` is new content but does
    /// not come after the row's latest version.
    pub fn record(&mut self, key: CanonicalKey, entry: ChecksumEntry) -> Result<bool, TableError> {
        if let Some(last) = self.rows.get(&key).and_then(|row| row.last()) {
            if last.same_content(&entry) {
                return Ok(false);
            }
            if entry.version <= last.version {
                return Err(TableError::UnorderedVersions {
                    hash: key.name_hash(),
                    previous: last.version,
                    next: entry.version,
                });
            }
        }
        self.rows.entry(key).or_default().push(entry);
        Ok(true)
    }

    /// Merge the fingerprints of one asset root, all observed at `version`.
    pub fn merge<I>(&mut self, version: i32, fingerprints: I) -> Result<MergeStats, TableError>
    where
        I: IntoIterator<Item = (CanonicalKey, (i32, u64))>,
    {
        let mut stats = MergeStats::default();
        for (key, (size, checksum)) in fingerprints {
            let seen = self.rows.contains_key(&key);
            let appended = self.record(key, ChecksumEntry::new(version, size, checksum))?;
            match (seen, appended) {
                (false, _) => stats.added += 1,
                (true, true) => stats.changed += 1,
                (true, false) => stats.unchanged += 1,
            }
        }
        Ok(stats)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&[ChecksumEntry]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    /// Iterate rows in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &[ChecksumEntry])> + '_ {
        self.rows.iter().map(|(key, row)| (key, row.as_slice()))
    }

    /// Hash every key and build the query-time table.
    ///
    /// # Errors
    ///
    /// `TableError::NameHashCollision` if two keys share a name hash.
    pub fn to_table(&self, base_version: i32) -> Result<ChecksumTable, TableError> {
        let mut owners: HashMap<NameHash, &CanonicalKey> = HashMap::with_capacity(self.len());
        let mut rows = Vec::with_capacity(self.len());
        for (key, row) in &self.rows {
            let hash = key.name_hash();
            if let Some(first) = owners.insert(hash, key) {
                return Err(TableError::NameHashCollision {
                    hash,
                    first: first.to_string(),
                    second: key.to_string(),
                });
            }
            rows.push((hash, row.clone()));
        }
        ChecksumTable::from_rows(base_version, rows)
    }

    /// Write the history as pretty-printed JSON, canonical key to entries.
    pub fn write_debug_json<W: Write>(&self, mut writer: W) -> Result<(), TableError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
