//! # Dictionary Registry
//!
//! Asset roots compress most files against a small set of shared zstd
//! dictionaries shipped in `Pack/ZsDic.pack.zs`. The registry digests each
//! dictionary once, when it is loaded, and hands out a [`Codec`] bound to
//! the prepared dictionary a frame names.
//!
//! The registry is filled while a root is opened and only read afterwards.
//! Prepared dictionaries are `Send + Sync`; codecs borrow them and create
//! only a light zstd context per call, so a `&DictionaryRegistry` can be
//! shared across worker threads without locking.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use zstd::bulk::{Compressor, Decompressor};
use zstd::dict::{DecoderDictionary, EncoderDictionary};

use crate::error::CodecError;
use crate::frame;
use crate::sarc::{self, Sarc};

/// zstd dictionary magic, little-endian at offset 0.
pub const DICTIONARY_MAGIC: u32 = 0xEC30_A437;

const DICTIONARY_ID_OFFSET: usize = 4;

/// Largest decompressed size a frame may declare. Table entries store sizes
/// as `i32`.
pub const MAX_DECOMPRESSED_SIZE: usize = i32::MAX as usize;

/// Worst-case compressed size for `len` input bytes.
pub fn compress_bound(len: usize) -> usize {
    zstd::zstd_safe::compress_bound(len)
}

/// Read the dictionary id of a zstd dictionary, or `None` if the buffer is
/// not one.
pub fn dictionary_id(buffer: &[u8]) -> Option<u32> {
    let header = buffer.get(..DICTIONARY_ID_OFFSET + 4)?;
    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    (magic == DICTIONARY_MAGIC)
        .then(|| u32::from_le_bytes([header[4], header[5], header[6], header[7]]))
}

/// One dictionary, digested for both directions.
struct PreparedDictionary {
    id: u32,
    decoder: DecoderDictionary<'static>,
    encoder: EncoderDictionary<'static>,
}

impl PreparedDictionary {
    /// Digest a raw dictionary.
    ///
    /// `DecoderDictionary::copy` cannot report a malformed dictionary, so
    /// zstd loads it into a throwaway context first and errors come back
    /// from there.
    fn prepare(id: u32, raw: &[u8]) -> Result<Self, CodecError> {
        Decompressor::with_dictionary(raw).map_err(CodecError::Zstd)?;
        Ok(Self {
            id,
            decoder: DecoderDictionary::copy(raw),
            encoder: EncoderDictionary::copy(raw, zstd::DEFAULT_COMPRESSION_LEVEL),
        })
    }
}

impl fmt::Debug for PreparedDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedDictionary")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A compression context, optionally bound to one dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec<'a> {
    dictionary: Option<&'a PreparedDictionary>,
}

impl<'a> Codec<'a> {
    /// Id of the bound dictionary, `None` for the default codec.
    pub fn dictionary_id(&self) -> Option<u32> {
        self.dictionary.map(|dictionary| dictionary.id)
    }

    fn decompressor(&self) -> Result<Decompressor<'a>, CodecError> {
        match self.dictionary {
            Some(dictionary) => Decompressor::with_prepared_dictionary(&dictionary.decoder),
            None => Decompressor::new(),
        }
        .map_err(CodecError::Zstd)
    }

    /// Compressor at the default level, the level bound dictionaries were
    /// prepared for.
    fn compressor(&self) -> Result<Compressor<'a>, CodecError> {
        match self.dictionary {
            Some(dictionary) => Compressor::with_prepared_dictionary(&dictionary.encoder),
            None => Compressor::new(zstd::DEFAULT_COMPRESSION_LEVEL),
        }
        .map_err(CodecError::Zstd)
    }

    /// Decompress `src` into `dst`, which must be exactly the decompressed
    /// size.
    pub fn decompress_into(&self, src: &[u8], dst: &mut [u8]) -> Result<(), CodecError> {
        let written = self
            .decompressor()?
            .decompress_to_buffer(src, dst)
            .map_err(CodecError::Zstd)?;
        if written != dst.len() {
            return Err(CodecError::SizeMismatch {
                expected: dst.len(),
                actual: written,
            });
        }
        Ok(())
    }

    /// Compress `src` into `dst` at the default level and return the number
    /// of bytes written. `dst` must hold at least
    /// [`compress_bound`]`(src.len())` bytes.
    pub fn compress_into(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        self.compressor()?
            .compress_to_buffer(src, dst)
            .map_err(CodecError::Zstd)
    }

    /// Compress `src` at the default level into a new buffer.
    pub fn compress(&self, src: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.compressor()?
            .compress(src)
            .map_err(CodecError::Zstd)
    }
}

/// Dictionaries known for one asset root, keyed by dictionary id.
#[derive(Default)]
pub struct DictionaryRegistry {
    dictionaries: HashMap<u32, PreparedDictionary>,
}

impl fmt::Debug for DictionaryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl DictionaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered dictionaries.
    pub fn len(&self) -> usize {
        self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.dictionaries.contains_key(&id)
    }

    /// Registered dictionary ids in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.dictionaries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Register every dictionary found in `buffer` and return how many were
    /// registered.
    ///
    /// The buffer may be a single dictionary, a SARC archive of
    /// dictionaries, or either of those wrapped in a zstd frame. Archive
    /// members that are not dictionaries are skipped. Anything else
    /// registers nothing. A repeated id replaces the earlier dictionary.
    pub fn load(&mut self, buffer: &[u8]) -> Result<usize, CodecError> {
        let data = match frame::inspect(buffer)? {
            Some(header) => {
                let mut out = allocate(header.decompressed_size)?;
                Codec::default().decompress_into(buffer, &mut out)?;
                Cow::Owned(out)
            }
            None => Cow::Borrowed(buffer),
        };

        if self.register(&data)? {
            return Ok(1);
        }
        if !sarc::is_sarc(&data) {
            tracing::debug!(len = data.len(), "buffer holds no dictionaries");
            return Ok(0);
        }

        let archive = Sarc::parse(&data)?;
        let mut registered = 0;
        for (name, member) in archive.iter() {
            if self.register(member)? {
                tracing::trace!(member = name, "registered dictionary");
                registered += 1;
            }
        }
        Ok(registered)
    }

    /// Read a file and [`load`](Self::load) it.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, CodecError> {
        let buffer = std::fs::read(path)?;
        let registered = self.load(&buffer)?;
        tracing::debug!(path = %path.display(), registered, "loaded dictionaries");
        Ok(registered)
    }

    fn register(&mut self, buffer: &[u8]) -> Result<bool, CodecError> {
        let Some(id) = dictionary_id(buffer) else {
            return Ok(false);
        };
        let prepared = PreparedDictionary::prepare(id, buffer)?;
        if self.dictionaries.insert(id, prepared).is_some() {
            tracing::debug!(id, "replaced dictionary");
        }
        Ok(true)
    }

    /// Codec for a frame's dictionary id. Unknown ids and `None` resolve to
    /// the default codec.
    pub fn resolve(&self, id: Option<u32>) -> Codec<'_> {
        Codec {
            dictionary: id.and_then(|id| self.dictionaries.get(&id)),
        }
    }

    /// Decompress a zstd frame using the dictionary its header names.
    pub fn decompress(&self, src: &[u8]) -> Result<Vec<u8>, CodecError> {
        let header = frame::inspect(src)?.ok_or(CodecError::NotCompressed)?;
        let mut out = allocate(header.decompressed_size)?;
        self.resolve(header.dictionary_id)
            .decompress_into(src, &mut out)?;
        Ok(out)
    }

    /// Decompress `data` if it is a zstd frame, otherwise borrow it as is.
    pub fn decode<'d>(&self, data: &'d [u8]) -> Result<Cow<'d, [u8]>, CodecError> {
        if frame::is_compressed(data) {
            Ok(Cow::Owned(self.decompress(data)?))
        } else {
            Ok(Cow::Borrowed(data))
        }
    }
}

fn allocate(size: usize) -> Result<Vec<u8>, CodecError> {
    if size > MAX_DECOMPRESSED_SIZE {
        return Err(CodecError::OversizedFrame(size));
    }
    Ok(vec![0u8; size])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sarc::SarcWriter;

    /// Train a small dictionary over synthetic parameter files.
    pub(crate) fn train_dictionary(seed: u32) -> Vec<u8> {
        let samples: Vec<Vec<u8>> = (0..2000u32)
            .map(|i| {
                format!(
                    "{{\"Name\":\"Weapon_Sword_{:03}\",\"Attack\":{},\"Durability\":{},\"Seed\":{seed},\"Tags\":[\"Melee\",\"Metal\"]}}",
                    i % 97,
                    (i * 7) % 60,
                    (i * 13) % 45
                )
                .into_bytes()
            })
            .collect();
        zstd::dict::from_samples(&samples, 4096).unwrap()
    }

    #[test]
    fn dictionary_id_reads_header() {
        let mut buf = DICTIONARY_MAGIC.to_le_bytes().to_vec();
        buf.extend_from_slice(&42u32.to_le_bytes());
        assert_eq!(dictionary_id(&buf), Some(42));
        assert_eq!(dictionary_id(&buf[..6]), None);
        assert_eq!(dictionary_id(b"SARC\x14\x00\xFF\xFE"), None);
    }

    #[test]
    fn default_codec_roundtrip() {
        let codec = Codec::default();
        let src = b"Default codec payload, repeated. Default codec payload, repeated.";
        let compressed = codec.compress(src).unwrap();

        let mut out = vec![0u8; src.len()];
        codec.decompress_into(&compressed, &mut out).unwrap();
        assert_eq!(&out[..], &src[..]);
    }

    #[test]
    fn decompress_into_rejects_wrong_size() {
        let codec = Codec::default();
        let compressed = codec.compress(&[5u8; 64]).unwrap();
        let mut larger = vec![0u8; 80];
        let err = codec.decompress_into(&compressed, &mut larger).unwrap_err();
        assert!(matches!(
            err,
            CodecError::SizeMismatch {
                expected: 80,
                actual: 64
            }
        ));
    }

    #[test]
    fn compress_into_fits_bound() {
        let src = vec![9u8; 10_000];
        let mut dst = vec![0u8; compress_bound(src.len())];
        let written = Codec::default().compress_into(&src, &mut dst).unwrap();
        assert!(written > 0 && written < src.len());
        let registry = DictionaryRegistry::new();
        assert_eq!(registry.decompress(&dst[..written]).unwrap(), src);
    }

    #[test]
    fn load_plain_dictionary() {
        let dict = train_dictionary(1);
        let id = dictionary_id(&dict).unwrap();

        let mut registry = DictionaryRegistry::new();
        assert_eq!(registry.load(&dict).unwrap(), 1);
        assert!(registry.contains(id));
        assert_eq!(registry.resolve(Some(id)).dictionary_id(), Some(id));
    }

    #[test]
    fn resolve_unknown_id_falls_back_to_default() {
        let registry = DictionaryRegistry::new();
        assert_eq!(registry.resolve(Some(1234)).dictionary_id(), None);
        assert_eq!(registry.resolve(None).dictionary_id(), None);
    }

    #[test]
    fn load_compressed_archive_of_dictionaries() {
        let first = train_dictionary(1);
        let second = train_dictionary(2);
        let mut writer = SarcWriter::new();
        writer
            .add("zs.zsdic", first.clone())
            .add("bcett.byml.zsdic", second.clone())
            .add("readme.txt", b"not a dictionary".to_vec());
        let pack = Codec::default().compress(&writer.to_bytes()).unwrap();

        let mut registry = DictionaryRegistry::new();
        let registered = registry.load(&pack).unwrap();
        assert_eq!(registered, 2);
        assert!(registry.contains(dictionary_id(&first).unwrap()));
        assert!(registry.contains(dictionary_id(&second).unwrap()));
    }

    #[test]
    fn load_unrelated_buffer_registers_nothing() {
        let mut registry = DictionaryRegistry::new();
        assert_eq!(registry.load(b"BYML plain bytes").unwrap(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn dictionary_frames_roundtrip_through_registry() {
        let dict = train_dictionary(3);
        let id = dictionary_id(&dict).unwrap();
        let mut registry = DictionaryRegistry::new();
        registry.load(&dict).unwrap();

        let src = br#"{"Name":"Weapon_Sword_070","Attack":12,"Durability":30,"Seed":3,"Tags":["Melee","Metal"]}"#;
        let compressed = registry.resolve(Some(id)).compress(src).unwrap();
        let header = frame::inspect(&compressed).unwrap().unwrap();
        assert_eq!(header.dictionary_id, Some(id));
        assert_eq!(header.decompressed_size, src.len());

        assert_eq!(registry.decompress(&compressed).unwrap(), src.to_vec());
    }

    #[test]
    fn resolved_codecs_share_one_prepared_dictionary() {
        let dict = train_dictionary(5);
        let id = dictionary_id(&dict).unwrap();
        let mut registry = DictionaryRegistry::new();
        registry.load(&dict).unwrap();

        let first = registry.resolve(Some(id));
        let second = registry.resolve(Some(id));
        assert!(std::ptr::eq(
            first.dictionary.unwrap(),
            second.dictionary.unwrap()
        ));

        let src = br#"{"Name":"Weapon_Sword_012","Attack":24,"Durability":11,"Seed":5,"Tags":["Melee","Metal"]}"#;
        let compressed = first.compress(src).unwrap();
        for codec in [first, second] {
            let mut out = vec![0u8; src.len()];
            codec.decompress_into(&compressed, &mut out).unwrap();
            assert_eq!(&out[..], &src[..]);
        }
        let mut out = vec![0u8; src.len()];
        assert!(Codec::default().decompress_into(&compressed, &mut out).is_err());
    }

    #[test]
    fn malformed_dictionary_is_rejected_on_load() {
        let mut bogus = DICTIONARY_MAGIC.to_le_bytes().to_vec();
        bogus.extend_from_slice(&7u32.to_le_bytes());
        bogus.extend_from_slice(&[0xFF; 32]);
        let mut registry = DictionaryRegistry::new();
        assert!(matches!(registry.load(&bogus), Err(CodecError::Zstd(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn decode_borrows_plain_data() {
        let registry = DictionaryRegistry::new();
        let plain = b"plain";
        assert!(matches!(registry.decode(plain).unwrap(), Cow::Borrowed(_)));
        assert!(matches!(
            registry.decompress(plain),
            Err(CodecError::NotCompressed)
        ));
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ZsDic.pack.zs");
        let dict = train_dictionary(4);
        let compressed = Codec::default().compress(&dict).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let mut registry = DictionaryRegistry::new();
        assert_eq!(registry.load_file(&path).unwrap(), 1);
        assert_eq!(registry.ids(), vec![dictionary_id(&dict).unwrap()]);
    }
}
