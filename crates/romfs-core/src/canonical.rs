//! # Canonical Resource Keys
//!
//! This module defines `CanonicalKey`, the version-invariant identity of a
//! resource inside an asset root, and the canonicalization pipeline that
//! produces it.
//!
//! ## Invariants
//!
//! The `CanonicalKey` newtype has a private inner field. The only ways to
//! construct one run [`canonicalize_relative()`], so every key in the
//! workspace has:
//!
//! 1. **Forward slashes only**, no leading `/`.
//! 2. **No storage decorations**: the trailing `.zs` (zstd compressed) and
//!    `.mc` (multi-content variant) extensions are stripped.
//! 3. **No release infix**: a `.Product.NNN.` version code in the file name
//!    collapses to `.Product.`, so `ResourceSizeTable.Product.110.rsizetable`
//!    and `ResourceSizeTable.Product.120.rsizetable` share one identity.
//!
//! Each rule runs to a fixpoint, which makes canonicalization idempotent:
//! `canonicalize_relative(key.as_str()).0 == key` for every key.

use std::fmt;
use std::ops::Range;
use std::path::Path;

use bitflags::bitflags;
use serde::Serialize;

use crate::digest::NameHash;
use crate::error::CanonicalizationError;

const COMPRESSED_EXTENSION: &str = ".zs";
const VARIANT_EXTENSION: &str = ".mc";
const PRODUCT_MARKER: &str = ".Product.";

/// Length of the `NNN.` version code that follows [`PRODUCT_MARKER`].
const VERSION_CODE_LEN: usize = 4;

bitflags! {
    /// Storage attributes observed while canonicalizing a path.
    ///
    /// The collector and verifier use these to decide whether a file must be
    /// decompressed and whether it can be processed at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RomfsAttributes: u8 {
        /// The path carried a `.zs` extension (zstd frame on disk).
        const HAS_COMPRESSED_EXTENSION = 1;
        /// The path carried a `.mc` extension (multi-content container).
        const HAS_VARIANT_EXTENSION = 1 << 1;
        /// The file name carried a `.Product.NNN.` release infix.
        const IS_PRODUCT_FILE = 1 << 2;
    }
}

/// The canonical, version-invariant identity of a resource.
///
/// Keys are relative to the asset root and compare byte-wise, so a
/// `BTreeMap<CanonicalKey, _>` iterates in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Canonicalize a root-relative path into a key, discarding attributes.
    pub fn new(path: &str) -> Self {
        canonicalize_relative(path).0
    }

    /// Access the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compute the table lookup hash for this key.
    pub fn name_hash(&self) -> NameHash {
        NameHash::of(self)
    }

    /// The final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The extension of the final path component, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().rsplit_once('.').map(|(_, ext)| ext)
    }

    /// Returns true for `.pack` containers, whose members keep their own
    /// identity instead of nesting under the container.
    pub fn is_pack(&self) -> bool {
        self.extension() == Some("pack")
    }

    /// Nest a container member under this key (`parent/member`).
    pub fn nest(&self, member: &CanonicalKey) -> CanonicalKey {
        CanonicalKey(format!("{}/{}", self.0, member.0))
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize `path` relative to the asset `root`.
///
/// # Errors
///
/// Returns `CanonicalizationError::OutsideRoot` if `root` is not a prefix of
/// `path`, and `CanonicalizationError::NonUtf8` if the relative path cannot
/// be represented as UTF-8.
pub fn canonicalize(
    path: &Path,
    root: &Path,
) -> Result<(CanonicalKey, RomfsAttributes), CanonicalizationError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| CanonicalizationError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    let relative = relative
        .to_str()
        .ok_or_else(|| CanonicalizationError::NonUtf8(path.to_path_buf()))?;
    Ok(canonicalize_relative(relative))
}

/// Canonicalize a path that is already relative to the asset root.
///
/// Also used for archive member names, which are root-relative by
/// construction.
pub fn canonicalize_relative(path: &str) -> (CanonicalKey, RomfsAttributes) {
    let mut attributes = RomfsAttributes::empty();
    let normalized = path.replace('\\', "/");

    let mut trimmed = normalized.trim_start_matches('/');
    loop {
        if let Some(stripped) = trimmed.strip_suffix(COMPRESSED_EXTENSION) {
            attributes |= RomfsAttributes::HAS_COMPRESSED_EXTENSION;
            trimmed = stripped;
        } else if let Some(stripped) = trimmed.strip_suffix(VARIANT_EXTENSION) {
            attributes |= RomfsAttributes::HAS_VARIANT_EXTENSION;
            trimmed = stripped;
        } else {
            break;
        }
    }

    let mut canonical = trimmed.to_owned();
    while let Some(range) = version_code_range(&canonical) {
        canonical.replace_range(range, "");
        attributes |= RomfsAttributes::IS_PRODUCT_FILE;
    }

    (CanonicalKey(canonical), attributes)
}

/// Locate the first `NNN.` version code that directly follows a
/// `.Product.` marker in the file name component.
fn version_code_range(path: &str) -> Option<Range<usize>> {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];

    name.match_indices(PRODUCT_MARKER).find_map(|(idx, marker)| {
        let start = name_start + idx + marker.len();
        let end = start + VERSION_CODE_LEN;
        let code = path.get(start..end)?.as_bytes();
        let is_version_code = code[..VERSION_CODE_LEN - 1]
            .iter()
            .all(u8::is_ascii_digit)
            && code[VERSION_CODE_LEN - 1] == b'.';
        is_version_code.then_some(start..end)
    })
}
