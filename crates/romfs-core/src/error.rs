//! # Error Types
//!
//! Errors shared by every crate that handles asset roots. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for asset-root operations in `romfs-core`.
#[derive(Error, Debug)]
pub enum RomfsError {
    /// A path could not be turned into a canonical key.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A directory of the asset tree could not be listed.
    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir {
        /// The directory being listed.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while canonicalizing a filesystem path.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The asset root is not a prefix of the path.
    #[error("{} is not inside asset root {}", path.display(), root.display())]
    OutsideRoot {
        /// The path that was canonicalized.
        path: PathBuf,
        /// The asset root it was expected to live under.
        root: PathBuf,
    },

    /// The root-relative path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8(PathBuf),
}
