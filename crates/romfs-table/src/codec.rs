//! # Binary Table Codec
//!
//! Reads and writes the fixed-width little-endian table artifact. Rows are
//! written in ascending name-hash order, so encoding the same table twice
//! yields identical bytes.
//!
//! Decoding validates as it goes: truncation, negative counts, duplicate
//! rows, out-of-order versions and trailing bytes are all rejected.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use romfs_core::NameHash;

use crate::entry::ChecksumEntry;
use crate::error::TableError;
use crate::table::{validate_row, ChecksumTable};

/// Smallest possible encoded row: hash plus an entry count.
const MIN_ROW_LEN: usize = 12;

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], TableError> {
        let remaining = self.remaining();
        let chunk = self
            .bytes
            .get(self.offset..self.offset + N)
            .ok_or(TableError::Truncated {
                offset: self.offset,
                needed: N - remaining.min(N),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        self.offset += N;
        Ok(out)
    }

    fn i32(&mut self) -> Result<i32, TableError> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    fn u64(&mut self) -> Result<u64, TableError> {
        self.take::<8>().map(u64::from_le_bytes)
    }

    fn count(&mut self) -> Result<usize, TableError> {
        let offset = self.offset;
        let count = self.i32()?;
        usize::try_from(count).map_err(|_| TableError::NegativeCount { offset, count })
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }
}

impl ChecksumTable {
    /// Decode a table from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TableError> {
        let mut cursor = Cursor { bytes, offset: 0 };
        let base_version = cursor.i32()?;
        let row_count = cursor.count()?;

        // Counts come from untrusted input; never reserve more than the
        // remaining bytes could hold.
        let mut rows = HashMap::with_capacity(row_count.min(cursor.remaining() / MIN_ROW_LEN));
        for _ in 0..row_count {
            let hash = NameHash(cursor.u64()?);
            let entry_count = cursor.count()?;
            let mut entries = Vec::with_capacity(
                entry_count.min(cursor.remaining() / ChecksumEntry::ENCODED_LEN),
            );
            for _ in 0..entry_count {
                let version = cursor.i32()?;
                let size = cursor.i32()?;
                let checksum = cursor.u64()?;
                entries.push(ChecksumEntry::new(version, size, checksum));
            }
            validate_row(hash, &entries)?;
            if rows.insert(hash, entries).is_some() {
                return Err(TableError::DuplicateRow(hash));
            }
        }

        let trailing = cursor.remaining();
        if trailing > 0 {
            return Err(TableError::TrailingBytes { count: trailing });
        }

        tracing::debug!(base_version, rows = rows.len(), "decoded checksum table");
        ChecksumTable::from_rows(base_version, rows)
    }

    /// Read the whole of `reader` and decode it.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, TableError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Load a table artifact from disk.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let bytes = std::fs::read(path)?;
        let table = Self::from_bytes(&bytes)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            base_version = table.base_version(),
            "loaded checksum table"
        );
        Ok(table)
    }

    /// Encode the table, rows ascending by name hash.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), TableError> {
        writer.write_all(&self.base_version().to_le_bytes())?;
        writer.write_all(&encode_count("row count", self.len())?.to_le_bytes())?;
        for (hash, row) in self.sorted_rows() {
            writer.write_all(&hash.value().to_le_bytes())?;
            writer.write_all(&encode_count("entry count", row.len())?.to_le_bytes())?;
            for entry in row {
                writer.write_all(&entry.version.to_le_bytes())?;
                writer.write_all(&entry.size.to_le_bytes())?;
                writer.write_all(&entry.checksum.to_le_bytes())?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Encode the table into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TableError> {
        let len = 8
            + self.len() * MIN_ROW_LEN
            + self.entry_count() * ChecksumEntry::ENCODED_LEN;
        let mut out = Vec::with_capacity(len);
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the table artifact to disk, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        tracing::info!(path = %path.display(), rows = self.len(), "wrote checksum table");
        Ok(())
    }
}

fn encode_count(what: &'static str, value: usize) -> Result<i32, TableError> {
    i32::try_from(value).map_err(|_| TableError::Overflow { what, value })
}
