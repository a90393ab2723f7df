//! # romfs-codec — Storage Codecs for Asset Roots
//!
//! Everything needed to get from bytes on disk to the bytes that are
//! fingerprinted:
//!
//! - **Frame inspection** ([`frame`]): reads the decompressed size and
//!   dictionary id from a zstd frame header without decompressing.
//! - **Dictionary registry** ([`dictionary`]): loads the root's shared
//!   compression dictionaries and resolves a [`Codec`] per dictionary id.
//! - **SARC archives** ([`sarc`]): iterates the named members of an
//!   archive container.
//! - **Root context** ([`context`]): the explicit per-root value (version
//!   and dictionaries) passed to the collector and verifier.
//!
//! ## Crate Policy
//!
//! - Depends only on `romfs-core` internally.
//! - The registry is built once per root and shared immutably afterwards.
//!   No global codec state.

pub mod context;
pub mod dictionary;
pub mod error;
pub mod frame;
pub mod sarc;

pub use context::RomfsContext;
pub use dictionary::{compress_bound, Codec, DictionaryRegistry};
pub use error::{CodecError, FrameError};
pub use frame::{inspect, is_compressed, FrameHeader};
pub use sarc::{is_sarc, Sarc, SarcWriter};
