//! # Release Version Detection
//!
//! Every asset root records its release version in
//! `System/RegionLangMask.txt`; the third line holds the version number
//! (`100`, `110`, `121`, ...). Roots without the file, or whose file has
//! no usable version line, are treated as the launch release.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RomfsError;

/// Version assumed for roots without version metadata.
pub const DEFAULT_VERSION: i32 = 100;

/// Location of the version metadata file, relative to the asset root.
const REGION_LANG_MASK: [&str; 2] = ["System", "RegionLangMask.txt"];

/// Zero-based line index holding the version number.
const VERSION_LINE: usize = 2;

/// Path of the version metadata file for an asset root.
pub fn version_file(root: &Path) -> PathBuf {
    REGION_LANG_MASK
        .iter()
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// Detect the release version of an asset root.
///
/// Returns [`DEFAULT_VERSION`] when the metadata file is absent, has fewer
/// than three lines, or its version line is not an integer.
///
/// # Errors
///
/// Returns `RomfsError::Io` if the file exists but cannot be read.
pub fn detect_version(root: &Path) -> Result<i32, RomfsError> {
    let path = version_file(root);
    if !path.is_file() {
        tracing::debug!(root = %root.display(), "no version metadata, assuming {DEFAULT_VERSION}");
        return Ok(DEFAULT_VERSION);
    }

    let content = fs::read_to_string(&path)?;
    match parse_version(&content) {
        Ok(version) => Ok(version),
        Err(reason) => {
            tracing::warn!(
                path = %path.display(),
                %reason,
                "unusable version metadata, assuming {DEFAULT_VERSION}"
            );
            Ok(DEFAULT_VERSION)
        }
    }
}

fn parse_version(content: &str) -> Result<i32, String> {
    let line = content
        .lines()
        .nth(VERSION_LINE)
        .ok_or_else(|| format!("expected at least {} lines", VERSION_LINE + 1))?;
    line.trim()
        .parse()
        .map_err(|e| format!("version line {:?} is not an integer: {e}", line.trim()))
}
