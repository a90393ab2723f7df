//! # Collector
//!
//! Drives the per-root passes in version order and owns the resulting
//! [`VersionHistory`].

use std::io::Write;
use std::path::{Path, PathBuf};

use romfs_codec::RomfsContext;
use romfs_table::{ChecksumTable, MergeStats, VersionHistory};

use crate::error::CollectError;
use crate::pass::RootPass;

/// Counters for one collected root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub root: PathBuf,
    pub version: i32,
    /// Files read from disk.
    pub files: usize,
    /// Archive members fingerprinted.
    pub archive_members: usize,
    /// Variant and ignored resources.
    pub skipped: usize,
    /// Keys reached more than once with different content.
    pub conflicts: usize,
    /// Distinct canonical keys in this root.
    pub keys: usize,
    /// Result of merging into the history.
    pub merge: MergeStats,
}

/// Builds a checksum table from several asset roots.
#[derive(Debug)]
pub struct Collector {
    contexts: Vec<RomfsContext>,
    history: VersionHistory,
    stats: Vec<CollectStats>,
    collected: bool,
}

impl Collector {
    /// Open every root and order them by detected version.
    pub fn new<I, P>(roots: I) -> Result<Self, CollectError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let contexts = roots
            .into_iter()
            .map(|root| {
                let root = root.as_ref();
                RomfsContext::open(root).map_err(|source| CollectError::Open {
                    root: root.to_path_buf(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_contexts(contexts)
    }

    /// Use already opened roots.
    ///
    /// # Errors
    ///
    /// `CollectError::NoRoots` for an empty list and
    /// `CollectError::DuplicateVersion` if two roots share a version.
    pub fn from_contexts(mut contexts: Vec<RomfsContext>) -> Result<Self, CollectError> {
        if contexts.is_empty() {
            return Err(CollectError::NoRoots);
        }
        contexts.sort_by_key(RomfsContext::version);
        if let Some(pair) = contexts
            .windows(2)
            .find(|pair| pair[0].version() == pair[1].version())
        {
            return Err(CollectError::DuplicateVersion {
                version: pair[0].version(),
                first: pair[0].root().to_path_buf(),
                second: pair[1].root().to_path_buf(),
            });
        }
        Ok(Self {
            contexts,
            history: VersionHistory::new(),
            stats: Vec::new(),
            collected: false,
        })
    }

    /// Versions of the roots, in processing order.
    pub fn versions(&self) -> Vec<i32> {
        self.contexts.iter().map(RomfsContext::version).collect()
    }

    /// Version of the oldest root.
    pub fn base_version(&self) -> i32 {
        self.contexts.first().map_or(0, RomfsContext::version)
    }

    /// Process every root, oldest first. Calling it again is a no-op.
    pub fn collect(&mut self) -> Result<&VersionHistory, CollectError> {
        if self.collected {
            return Ok(&self.history);
        }

        for ctx in &self.contexts {
            let (fingerprints, mut stats) = RootPass::new(ctx).run()?;
            stats.merge = self.history.merge(ctx.version(), fingerprints)?;
            tracing::info!(
                root = %ctx.root().display(),
                version = ctx.version(),
                files = stats.files,
                archive_members = stats.archive_members,
                skipped = stats.skipped,
                added = stats.merge.added,
                changed = stats.merge.changed,
                "collected root"
            );
            self.stats.push(stats);
        }

        self.collected = true;
        tracing::info!(keys = self.history.len(), "collection complete");
        Ok(&self.history)
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// Per-root counters, in processing order.
    pub fn stats(&self) -> &[CollectStats] {
        &self.stats
    }

    /// Write the history as pretty JSON, canonical key to entries.
    pub fn write_debug_json<W: Write>(&self, writer: W) -> Result<(), CollectError> {
        Ok(self.history.write_debug_json(writer)?)
    }

    /// Hash the history collected so far into a table whose base version
    /// is the oldest root's version.
    pub fn to_table(&self) -> Result<ChecksumTable, CollectError> {
        Ok(self.history.to_table(self.base_version())?)
    }

    /// Collect if not done yet, then build the table.
    pub fn into_table(mut self) -> Result<ChecksumTable, CollectError> {
        self.collect()?;
        self.to_table()
    }
}

/// Collect `roots` into a checksum table.
pub fn collect<I, P>(roots: I) -> Result<ChecksumTable, CollectError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    Collector::new(roots)?.into_table()
}

#[cfg(test)]
mod tests {
    use super::*;
    use romfs_codec::DictionaryRegistry;

    fn ctx(root: &str, version: i32) -> RomfsContext {
        RomfsContext::new(root, version, DictionaryRegistry::new())
    }

    #[test]
    fn roots_are_ordered_by_version() {
        let collector =
            Collector::from_contexts(vec![ctx("/c", 121), ctx("/a", 100), ctx("/b", 110)]).unwrap();
        assert_eq!(collector.versions(), vec![100, 110, 121]);
        assert_eq!(collector.base_version(), 100);
    }

    #[test]
    fn duplicate_versions_are_rejected() {
        let err = Collector::from_contexts(vec![ctx("/a", 110), ctx("/b", 110)]).unwrap_err();
        assert!(matches!(err, CollectError::DuplicateVersion { version: 110, .. }));
    }

    #[test]
    fn empty_root_list_is_rejected() {
        assert!(matches!(
            Collector::from_contexts(Vec::new()),
            Err(CollectError::NoRoots)
        ));
        assert!(matches!(
            Collector::new(Vec::<PathBuf>::new()),
            Err(CollectError::NoRoots)
        ));
    }

    #[test]
    fn missing_root_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = Collector::new([dir.path().join("missing")]).unwrap_err();
        assert!(matches!(err, CollectError::Open { .. }));
    }
}
