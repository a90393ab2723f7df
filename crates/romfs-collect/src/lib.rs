//! # romfs-collect — Checksum Table Builder
//!
//! Ingests one snapshot of the asset tree per release, oldest first, and
//! records every resource's `(size, checksum)` whenever it changes.
//!
//! ## Pipeline
//!
//! 1. Open every root ([`RomfsContext::open`](romfs_codec::RomfsContext::open))
//!    and order them by detected version.
//! 2. For each root in turn, walk the tree in parallel. Every file is
//!    canonicalized, decompressed and fingerprinted. SARC containers are
//!    expanded recursively: members of `.pack` files keep their own
//!    identity, members of other containers nest under the container key.
//! 3. Merge the root's fingerprints into the
//!    [`VersionHistory`](romfs_table::VersionHistory), appending only
//!    content that differs from the latest entry.
//! 4. Hash the keys into a [`ChecksumTable`](romfs_table::ChecksumTable).
//!
//! Roots are processed strictly one at a time, so a row's versions are
//! appended in release order regardless of thread scheduling.

pub mod collector;
pub mod error;
mod pass;

pub use collector::{collect, CollectStats, Collector};
pub use error::CollectError;
