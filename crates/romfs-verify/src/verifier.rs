//! # Verifier
//!
//! ## Check Order
//!
//! 1. Canonical key to name hash; no row means [`Verdict::Unknown`].
//! 2. Pick the entry that applies to the requested version.
//! 3. Compare sizes. Plain content is measured directly, compressed content
//!    through its frame header, so a size mismatch never costs a
//!    decompression.
//! 4. Decompress if needed, hash, compare checksums.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use romfs_codec::frame::{self, MAX_HEADER_LEN};
use romfs_codec::DictionaryRegistry;
use romfs_core::{canonicalize, content_checksum, CanonicalKey};
use romfs_table::{ChecksumEntry, ChecksumTable};

use crate::verdict::Verdict;

/// Checks content against a loaded table.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    table: &'a ChecksumTable,
    dictionaries: &'a DictionaryRegistry,
}

impl<'a> Verifier<'a> {
    pub fn new(table: &'a ChecksumTable, dictionaries: &'a DictionaryRegistry) -> Self {
        Self {
            table,
            dictionaries,
        }
    }

    pub fn table(&self) -> &'a ChecksumTable {
        self.table
    }

    /// Check in-memory content (compressed or not) stored under `key`.
    pub fn check(&self, key: &CanonicalKey, content: &[u8], version: i32) -> Verdict {
        let Some(expected) = self.table.lookup(key, version) else {
            return Verdict::Unknown;
        };
        match declared_size(content, content.len() as u64) {
            Ok(actual) => {
                if let Some(mismatch) = compare_size(expected, actual) {
                    return mismatch;
                }
            }
            Err(verdict) => return verdict,
        }
        self.compare_content(expected, content)
    }

    pub fn is_vanilla(&self, key: &CanonicalKey, content: &[u8], version: i32) -> bool {
        self.check(key, content, version).is_vanilla()
    }

    /// Check a file below `root`.
    ///
    /// Paths outside `root` and files that cannot be read are never
    /// vanilla.
    pub fn check_file(&self, path: &Path, root: &Path, version: i32) -> Verdict {
        match canonicalize(path, root) {
            Ok((key, _)) => self.check_file_as(&key, path, version),
            Err(err) => Verdict::unreadable(err),
        }
    }

    pub fn is_vanilla_file(&self, path: &Path, root: &Path, version: i32) -> bool {
        self.check_file(path, root, version).is_vanilla()
    }

    /// Check the file at `path` against the row for an already
    /// canonicalized `key`.
    pub fn check_file_as(&self, key: &CanonicalKey, path: &Path, version: i32) -> Verdict {
        let Some(expected) = self.table.lookup(key, version) else {
            return Verdict::Unknown;
        };
        match self.read_checked(expected, path) {
            Ok(verdict) => verdict,
            Err(err) => Verdict::unreadable(err),
        }
    }

    fn read_checked(&self, expected: &ChecksumEntry, path: &Path) -> std::io::Result<Verdict> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();

        let mut content = Vec::with_capacity(MAX_HEADER_LEN);
        (&mut file)
            .take(MAX_HEADER_LEN as u64)
            .read_to_end(&mut content)?;

        match declared_size(&content, len) {
            Ok(actual) => {
                if let Some(mismatch) = compare_size(expected, actual) {
                    return Ok(mismatch);
                }
            }
            Err(verdict) => return Ok(verdict),
        }

        content.reserve(len.saturating_sub(content.len() as u64) as usize);
        file.read_to_end(&mut content)?;
        Ok(self.compare_content(expected, &content))
    }

    fn compare_content(&self, expected: &ChecksumEntry, content: &[u8]) -> Verdict {
        let data = match self.dictionaries.decode(content) {
            Ok(data) => data,
            Err(err) => return Verdict::malformed(err),
        };
        let actual = content_checksum(&data);
        if actual == expected.checksum {
            Verdict::Vanilla
        } else {
            Verdict::ChecksumMismatch {
                expected: expected.checksum,
                actual,
            }
        }
    }
}

/// Decompressed size of content whose first bytes are `prefix` and whose
/// stored length is `stored_len`.
fn declared_size(prefix: &[u8], stored_len: u64) -> Result<i64, Verdict> {
    match frame::inspect(prefix) {
        Ok(Some(header)) => Ok(header.decompressed_size as i64),
        Ok(None) => Ok(stored_len as i64),
        Err(err) => Err(Verdict::malformed(err)),
    }
}

fn compare_size(expected: &ChecksumEntry, actual: i64) -> Option<Verdict> {
    let expected = i64::from(expected.size);
    (expected != actual).then_some(Verdict::SizeMismatch { expected, actual })
}
