//! # Codec Error Types
//!
//! `FrameError` covers malformed zstd frame headers. A buffer that simply is
//! not a zstd frame is not an error: [`inspect()`](crate::frame::inspect)
//! reports it as `Ok(None)`.

use std::path::PathBuf;

use romfs_core::RomfsError;
use thiserror::Error;

/// A zstd frame header that cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer ends before a header field.
    #[error("frame header truncated: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to read the field.
        needed: usize,
        /// Bytes available in the buffer.
        available: usize,
    },

    /// The frame uses an 8-byte content size field.
    #[error("frame content size too large: 64-bit sizes are not supported")]
    SizeTooLarge,
}

/// Errors from compression, dictionary, and archive operations.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Malformed frame header.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Decompression was requested for data without a zstd frame.
    #[error("data is not a zstd frame")]
    NotCompressed,

    /// The declared decompressed size exceeds what a table entry can hold.
    #[error("declared decompressed size {0} exceeds the supported maximum")]
    OversizedFrame(usize),

    /// The zstd engine reported an error.
    #[error("zstd error: {0}")]
    Zstd(#[source] std::io::Error),

    /// Decompression produced a different number of bytes than declared.
    #[error("decompressed size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size declared by the frame header or destination buffer.
        expected: usize,
        /// Bytes actually produced.
        actual: usize,
    },

    /// Malformed SARC archive.
    #[error("SARC error: {0}")]
    Sarc(String),

    /// The asset root does not exist or is not a directory.
    #[error("asset root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Root metadata could not be read.
    #[error(transparent)]
    Romfs(#[from] RomfsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
