//! The outcome of checking one file.

use std::fmt;

use serde::Serialize;

/// Result of comparing a file against the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Byte-identical to the vanilla content for the requested version.
    Vanilla,
    /// The table has no row for the file's canonical key.
    Unknown,
    /// Decompressed sizes differ. Detected without hashing.
    SizeMismatch { expected: i64, actual: i64 },
    /// Sizes agree but the content checksum differs.
    ChecksumMismatch { expected: u64, actual: u64 },
    /// The content could not be decompressed or its header is invalid.
    Malformed { reason: String },
    /// The file could not be read or is outside the asset root.
    Unreadable { reason: String },
}

impl Verdict {
    pub fn is_vanilla(&self) -> bool {
        matches!(self, Verdict::Vanilla)
    }

    /// True for verdicts that mean the file differs from a known vanilla
    /// file, as opposed to being absent from the table.
    pub fn is_modified(&self) -> bool {
        !matches!(self, Verdict::Vanilla | Verdict::Unknown)
    }

    pub(crate) fn malformed(reason: impl fmt::Display) -> Self {
        Verdict::Malformed {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn unreadable(reason: impl fmt::Display) -> Self {
        Verdict::Unreadable {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Vanilla => f.write_str("vanilla"),
            Verdict::Unknown => f.write_str("not in table"),
            Verdict::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected} bytes, found {actual}")
            }
            Verdict::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch: expected {expected:016x}, found {actual:016x}")
            }
            Verdict::Malformed { reason } => write!(f, "malformed: {reason}"),
            Verdict::Unreadable { reason } => write!(f, "unreadable: {reason}"),
        }
    }
}
