//! # romfs-table — Version-Indexed Checksum Tables
//!
//! A checksum table maps the [`NameHash`](romfs_core::NameHash) of every
//! canonical resource to the ordered history of `(version, size, checksum)`
//! it has held across releases.
//!
//! - [`ChecksumTable`] is the read-only, query-time form. It is loaded
//!   from a compact binary artifact and answers "what should this resource
//!   look like in version N?" with a single hash lookup and a binary search.
//! - [`VersionHistory`] is the build-time form. It keeps the readable
//!   canonical keys, which makes name-hash collision detection and the
//!   human-readable debug dump possible.
//!
//! ## Binary Layout
//!
//! All fields little-endian, fixed width:
//!
//! ```text
//! baseVersion: i32
//! rowCount:    i32
//! rowCount times:
//!     nameHash:     u64
//!     versionCount: i32
//!     versionCount times:
//!         version:  i32
//!         size:     i32
//!         checksum: u64
//! ```

pub mod codec;
pub mod entry;
pub mod error;
pub mod history;
pub mod table;

pub use entry::ChecksumEntry;
pub use error::TableError;
pub use history::{MergeStats, VersionHistory};
pub use table::{select_entry, ChecksumTable};
