//! # Tree Integrity Scan
//!
//! Checks every file of a live asset tree against the table and sorts the
//! results into vanilla, modified, extra and ignored files. The table is
//! shared read-only; only the report under construction is locked.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use romfs_core::{canonicalize, is_ignored, par_walk_files, CanonicalKey, RomfsAttributes};
use serde::Serialize;

use crate::error::VerifyError;
use crate::verdict::Verdict;
use crate::verifier::Verifier;

/// Scan behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Stop checking further files once one modified file is found.
    pub fail_fast: bool,
}

/// One file that did not verify as vanilla.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Path relative to the scan root.
    pub path: PathBuf,
    pub key: CanonicalKey,
    pub verdict: Verdict,
}

/// Summary of a tree scan. Lists are sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Version the files were checked against.
    pub version: i32,
    /// Number of files that matched.
    pub vanilla: usize,
    /// Files in the table whose content differs or could not be read.
    pub modified: Vec<FileReport>,
    /// Files with no row in the table.
    pub extra: Vec<PathBuf>,
    /// Files excluded from checksum tables.
    pub ignored: Vec<PathBuf>,
    /// True when a fail-fast scan stopped early.
    pub aborted: bool,
}

impl IntegrityReport {
    /// True when no file was modified. Extra files are allowed.
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty()
    }

    pub fn checked(&self) -> usize {
        self.vanilla + self.modified.len() + self.extra.len()
    }

    fn sort(&mut self) {
        self.modified.sort_by(|a, b| a.path.cmp(&b.path));
        self.extra.sort();
        self.ignored.sort();
    }
}

impl Verifier<'_> {
    /// Check every file below `root` against `version`.
    pub fn scan_tree(&self, root: &Path, version: i32) -> Result<IntegrityReport, VerifyError> {
        self.scan_tree_with(root, version, ScanOptions::default())
    }

    pub fn scan_tree_with(
        &self,
        root: &Path,
        version: i32,
        options: ScanOptions,
    ) -> Result<IntegrityReport, VerifyError> {
        if !root.is_dir() {
            return Err(VerifyError::RootNotFound(root.to_path_buf()));
        }
        tracing::info!(root = %root.display(), version, "scanning asset tree");

        let report = Mutex::new(IntegrityReport {
            version,
            ..IntegrityReport::default()
        });
        let stop = AtomicBool::new(false);

        par_walk_files(root, &|path: &Path| -> Result<(), VerifyError> {
            if stop.load(Ordering::Relaxed) {
                return Ok(());
            }
            let (key, attributes) = canonicalize(path, root)?;
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

            if attributes.contains(RomfsAttributes::HAS_VARIANT_EXTENSION) || is_ignored(&key) {
                report.lock().ignored.push(relative);
                return Ok(());
            }

            let verdict = self.check_file_as(&key, path, version);
            let mut report = report.lock();
            match verdict {
                Verdict::Vanilla => report.vanilla += 1,
                Verdict::Unknown => report.extra.push(relative),
                verdict => {
                    tracing::debug!(key = %key, %verdict, "modified file");
                    report.modified.push(FileReport {
                        path: relative,
                        key,
                        verdict,
                    });
                    if options.fail_fast {
                        stop.store(true, Ordering::Relaxed);
                        report.aborted = true;
                    }
                }
            }
            Ok(())
        })?;

        let mut report = report.into_inner();
        report.sort();
        tracing::info!(
            vanilla = report.vanilla,
            modified = report.modified.len(),
            extra = report.extra.len(),
            ignored = report.ignored.len(),
            "scan complete"
        );
        Ok(report)
    }
}
