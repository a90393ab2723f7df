//! Errors from tree scans. Problems with a single file are reported as a
//! [`Verdict`](crate::Verdict), not as an error.

use std::path::PathBuf;

use romfs_core::{CanonicalizationError, RomfsError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    /// The scan root does not exist or is not a directory.
    #[error("scan root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The tree could not be walked.
    #[error(transparent)]
    Walk(#[from] RomfsError),

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
