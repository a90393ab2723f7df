//! # Table Error Types
//!
//! Load-time validation failures carry the byte offset where the problem
//! was found, so a corrupt artifact can be inspected with a hex viewer.

use romfs_core::NameHash;
use thiserror::Error;

/// Errors from building, encoding, or decoding a checksum table.
#[derive(Error, Debug)]
pub enum TableError {
    /// The input ended before a field.
    #[error("table truncated at offset {offset}: need {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    /// A row or entry count is negative.
    #[error("negative count {count} at offset {offset}")]
    NegativeCount { offset: usize, count: i32 },

    /// Two rows share a name hash.
    #[error("duplicate row for name hash {0}")]
    DuplicateRow(NameHash),

    /// A row has no entries.
    #[error("row for name hash {0} has no entries")]
    EmptyRow(NameHash),

    /// A row's versions are not strictly ascending.
    #[error("row {hash}: version {next} does not follow version {previous}")]
    UnorderedVersions {
        hash: NameHash,
        previous: i32,
        next: i32,
    },

    /// Bytes remain after the last row.
    #[error("{count} trailing bytes after the last row")]
    TrailingBytes { count: usize },

    /// Two distinct canonical keys hash to the same name hash.
    #[error("name hash collision {hash}: {first:?} and {second:?}")]
    NameHashCollision {
        hash: NameHash,
        first: String,
        second: String,
    },

    /// A value does not fit the fixed-width binary layout.
    #[error("{what} {value} does not fit in an i32")]
    Overflow { what: &'static str, value: usize },

    /// Debug dump serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_versions_display() {
        let err = TableError::UnorderedVersions {
            hash: NameHash(0xff),
            previous: 110,
            next: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("00000000000000ff"));
        assert!(msg.contains("110"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn collision_display_names_both_keys() {
        let err = TableError::NameHashCollision {
            hash: NameHash(1),
            first: "A.byml".into(),
            second: "B.byml".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("A.byml"));
        assert!(msg.contains("B.byml"));
    }
}
