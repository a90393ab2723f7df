//! One parallel pass over a single asset root.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use romfs_codec::{sarc, RomfsContext, Sarc};
use romfs_core::{
    canonicalize, canonicalize_relative, content_checksum, is_ignored, par_walk_files,
    CanonicalKey, RomfsAttributes,
};

use crate::collector::CollectStats;
use crate::error::CollectError;

pub(crate) type Fingerprint = (i32, u64);

/// Fingerprints gathered from one root, plus counters.
pub(crate) struct RootPass<'a> {
    ctx: &'a RomfsContext,
    fingerprints: Mutex<HashMap<CanonicalKey, Fingerprint>>,
    files: AtomicUsize,
    members: AtomicUsize,
    skipped: AtomicUsize,
    conflicts: AtomicUsize,
}

impl<'a> RootPass<'a> {
    pub(crate) fn new(ctx: &'a RomfsContext) -> Self {
        Self {
            ctx,
            fingerprints: Mutex::new(HashMap::new()),
            files: AtomicUsize::new(0),
            members: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            conflicts: AtomicUsize::new(0),
        }
    }

    /// Walk the root and return every canonical leaf's fingerprint.
    pub(crate) fn run(
        self,
    ) -> Result<(HashMap<CanonicalKey, Fingerprint>, CollectStats), CollectError> {
        par_walk_files(self.ctx.root(), &|path: &Path| self.visit_file(path))?;

        let fingerprints = self.fingerprints.into_inner();
        let stats = CollectStats {
            root: self.ctx.root().to_path_buf(),
            version: self.ctx.version(),
            files: self.files.into_inner(),
            archive_members: self.members.into_inner(),
            skipped: self.skipped.into_inner(),
            conflicts: self.conflicts.into_inner(),
            keys: fingerprints.len(),
            ..CollectStats::default()
        };
        Ok((fingerprints, stats))
    }

    fn visit_file(&self, path: &Path) -> Result<(), CollectError> {
        let (key, attributes) = canonicalize(path, self.ctx.root())?;
        if attributes.contains(RomfsAttributes::HAS_VARIANT_EXTENSION) || is_ignored(&key) {
            tracing::trace!(key = %key, "skipped");
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        self.files.fetch_add(1, Ordering::Relaxed);

        let raw = fs::read(path).map_err(|source| CollectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.visit(key, &raw)
    }

    /// Fingerprint one resource and expand it if it is an archive.
    fn visit(&self, key: CanonicalKey, stored: &[u8]) -> Result<(), CollectError> {
        let data = self
            .ctx
            .dictionaries()
            .decode(stored)
            .map_err(|source| CollectError::Codec {
                location: key.to_string(),
                source,
            })?;

        self.record(&key, &data)?;
        if sarc::is_sarc(&data) {
            self.expand(&key, &data)?;
        }
        Ok(())
    }

    fn expand(&self, container: &CanonicalKey, data: &[u8]) -> Result<(), CollectError> {
        let archive = Sarc::parse(data).map_err(|source| CollectError::Codec {
            location: container.to_string(),
            source,
        })?;
        let flatten = container.is_pack();

        archive.entries().par_iter().try_for_each(|entry| {
            let (member, attributes) = canonicalize_relative(entry.name);
            let key = if flatten {
                member
            } else {
                container.nest(&member)
            };
            if attributes.contains(RomfsAttributes::HAS_VARIANT_EXTENSION) || is_ignored(&key) {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            self.members.fetch_add(1, Ordering::Relaxed);
            self.visit(key, entry.data)
        })
    }

    fn record(&self, key: &CanonicalKey, data: &[u8]) -> Result<(), CollectError> {
        let size = i32::try_from(data.len()).map_err(|_| CollectError::TooLarge {
            location: key.to_string(),
            size: data.len(),
        })?;
        let fingerprint = (size, content_checksum(data));

        let mut fingerprints = self.fingerprints.lock();
        match fingerprints.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(fingerprint);
            }
            Entry::Occupied(mut slot) => {
                let existing = *slot.get();
                if existing != fingerprint {
                    // Reached through several containers with different
                    // content; keep the smaller fingerprint so the result
                    // does not depend on visit order.
                    tracing::debug!(
                        key = %key,
                        kept = ?existing.min(fingerprint),
                        "conflicting fingerprints within one root"
                    );
                    self.conflicts.fetch_add(1, Ordering::Relaxed);
                    if fingerprint < existing {
                        slot.insert(fingerprint);
                    }
                }
            }
        }
        Ok(())
    }
}
