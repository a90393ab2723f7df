//! # romfs-verify — Vanilla Content Verification
//!
//! Answers one question per file: is this byte-identical to the vanilla
//! content of the given release?
//!
//! A check costs one name-hash lookup and, when the sizes agree, one
//! decompression and one XXH3 pass. Historical versions are never
//! re-hashed; the table already holds the applicable fingerprint.
//!
//! [`Verifier`] borrows a loaded [`ChecksumTable`](romfs_table::ChecksumTable)
//! and a frozen [`DictionaryRegistry`](romfs_codec::DictionaryRegistry).
//! Both are read-only, so one verifier can be shared across threads.

pub mod error;
pub mod scan;
pub mod verdict;
pub mod verifier;

pub use error::VerifyError;
pub use scan::{FileReport, IntegrityReport, ScanOptions};
pub use verdict::Verdict;
pub use verifier::Verifier;
