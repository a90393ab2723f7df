//! # romfs-core — Foundational Types for romfs Integrity Tracking
//!
//! This crate is the leaf of the workspace. It defines the identity and
//! fingerprint primitives every other crate builds on:
//!
//! - **`CanonicalKey`**: the version-invariant identity of a resource.
//!   The only constructors run the canonicalization pipeline, so a key in
//!   hand is always canonical.
//! - **`NameHash`**: the 64-bit table lookup key derived from a
//!   `CanonicalKey`.
//! - **`content_checksum()`**: the 64-bit fingerprint of decompressed
//!   resource bytes.
//! - **`detect_version()`**: reads the release version of an asset root.
//! - **`par_walk_files()`**: parallel enumeration of an asset tree.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `romfs-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod version;
pub mod walk;

// Re-export primary types for ergonomic imports.
pub use canonical::{canonicalize, canonicalize_relative, CanonicalKey, RomfsAttributes};
pub use digest::{content_checksum, NameHash};
pub use error::{CanonicalizationError, RomfsError};
pub use version::{detect_version, DEFAULT_VERSION};
pub use walk::par_walk_files;

/// Canonical keys excluded from checksum tables.
///
/// The resource size table changes with every release and the dictionary
/// pack is the compression context itself, not game content.
pub const IGNORED_KEYS: &[&str] = &[
    "System/Resource/ResourceSizeTable.Product.rsizetable",
    "Pack/ZsDic.pack",
];

/// Returns true if the canonical key is on the fixed ignore list.
pub fn is_ignored(key: &CanonicalKey) -> bool {
    IGNORED_KEYS.contains(&key.as_str())
}
