//! # Root Context
//!
//! Everything derived once per asset root: its path, detected version and
//! dictionary registry. The collector and verifier take a `&RomfsContext`
//! instead of consulting process-wide state.

use std::path::{Path, PathBuf};

use romfs_core::detect_version;

use crate::dictionary::DictionaryRegistry;
use crate::error::CodecError;

/// Location of the shared dictionary pack inside an asset root.
pub const DICTIONARY_PACK: &str = "Pack/ZsDic.pack.zs";

/// Path of the dictionary pack for `root`.
pub fn dictionary_path(root: &Path) -> PathBuf {
    root.join(DICTIONARY_PACK)
}

/// An opened asset root.
#[derive(Debug)]
pub struct RomfsContext {
    root: PathBuf,
    version: i32,
    dictionaries: DictionaryRegistry,
}

impl RomfsContext {
    /// Open an asset root: detect its version and load its dictionaries.
    ///
    /// A root without a dictionary pack opens with an empty registry;
    /// dictionary-compressed files in it will then fail to decompress.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CodecError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CodecError::RootNotFound(root));
        }

        let version = detect_version(&root)?;
        let mut dictionaries = DictionaryRegistry::new();
        let pack = dictionary_path(&root);
        if pack.is_file() {
            dictionaries.load_file(&pack)?;
        } else {
            tracing::warn!(root = %root.display(), "no dictionary pack found");
        }

        tracing::info!(
            root = %root.display(),
            version,
            dictionaries = dictionaries.len(),
            "opened asset root"
        );
        Ok(Self {
            root,
            version,
            dictionaries,
        })
    }

    /// Build a context from parts, without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>, version: i32, dictionaries: DictionaryRegistry) -> Self {
        Self {
            root: root.into(),
            version,
            dictionaries,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn dictionaries(&self) -> &DictionaryRegistry {
        &self.dictionaries
    }
}
