//! # Collection Error Types
//!
//! Any error aborts the whole run. No table is produced from a partial
//! collection.

use std::path::PathBuf;

use romfs_codec::CodecError;
use romfs_core::{CanonicalizationError, RomfsError};
use romfs_table::TableError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    /// `Collector::new` was given no roots.
    #[error("no asset roots given")]
    NoRoots,

    /// An asset root could not be opened.
    #[error("cannot open asset root {}: {source}", root.display())]
    Open {
        root: PathBuf,
        #[source]
        source: CodecError,
    },

    /// Two roots report the same release version.
    #[error("asset roots {} and {} both have version {version}", first.display(), second.display())]
    DuplicateVersion {
        version: i32,
        first: PathBuf,
        second: PathBuf,
    },

    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file or archive member could not be decoded. `location` is the
    /// canonical key of the resource.
    #[error("cannot decode {location}: {source}")]
    Codec {
        location: String,
        #[source]
        source: CodecError,
    },

    /// A resource is larger than a table entry can record.
    #[error("{location} is {size} bytes, larger than a table entry can hold")]
    TooLarge { location: String, size: usize },

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The tree could not be walked.
    #[error(transparent)]
    Walk(#[from] RomfsError),

    #[error("table error: {0}")]
    Table(#[from] TableError),
}
