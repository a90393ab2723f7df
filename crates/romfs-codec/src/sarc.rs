//! # SARC Archives
//!
//! Read-only iteration over SARC containers plus a small writer for building
//! archives in tests and tools.
//!
//! ```text
//! SARC header   0x14 bytes   magic, header size, BOM, file size, data offset, version
//! SFAT header   0x0C bytes   magic, header size, node count, hash key
//! SFAT nodes    0x10 each    name hash, attributes, data begin, data end
//! SFNT header   0x08 bytes   magic, header size
//! names                      NUL-terminated, 4-byte aligned
//! data                       member bytes, offsets relative to data offset
//! ```
//!
//! The byte-order mark selects little- or big-endian for every field that
//! follows it.

use std::collections::BTreeMap;

use crate::error::CodecError;

const SARC_MAGIC: &[u8; 4] = b"SARC";
const SFAT_MAGIC: &[u8; 4] = b"SFAT";
const SFNT_MAGIC: &[u8; 4] = b"SFNT";

const SARC_HEADER_LEN: usize = 0x14;
const SFAT_HEADER_LEN: usize = 0x0C;
const SFAT_NODE_LEN: usize = 0x10;
const SFNT_HEADER_LEN: usize = 0x08;

const SARC_VERSION: u16 = 0x0100;
const HASH_KEY: u32 = 0x65;
const NAME_FLAG: u32 = 0x0100_0000;
const DATA_ALIGNMENT: usize = 8;

/// Returns `true` when the buffer starts with the SARC magic.
pub fn is_sarc(bytes: &[u8]) -> bool {
    bytes.starts_with(SARC_MAGIC)
}

/// Name hash stored in SFAT nodes.
pub fn name_hash(name: &str, key: u32) -> u32 {
    name.bytes().fold(0u32, |hash, byte| {
        hash.wrapping_mul(key).wrapping_add(byte as i8 as i32 as u32)
    })
}

fn malformed(reason: impl Into<String>) -> CodecError {
    CodecError::Sarc(reason.into())
}

struct Reader<'a> {
    bytes: &'a [u8],
    big_endian: bool,
}

impl<'a> Reader<'a> {
    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], CodecError> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or_else(|| malformed(format!("read of {len} bytes at {offset:#x} out of bounds")))
    }

    fn u16(&self, offset: usize) -> Result<u16, CodecError> {
        let b = self.slice(offset, 2)?;
        let raw = [b[0], b[1]];
        Ok(if self.big_endian {
            u16::from_be_bytes(raw)
        } else {
            u16::from_le_bytes(raw)
        })
    }

    fn u32(&self, offset: usize) -> Result<u32, CodecError> {
        let b = self.slice(offset, 4)?;
        let raw = [b[0], b[1], b[2], b[3]];
        Ok(if self.big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        })
    }

    fn expect_magic(&self, offset: usize, magic: &[u8; 4]) -> Result<(), CodecError> {
        if self.slice(offset, 4)? != magic {
            return Err(malformed(format!(
                "missing {} section at {offset:#x}",
                String::from_utf8_lossy(magic)
            )));
        }
        Ok(())
    }
}

/// One named archive member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarcEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

/// A parsed SARC archive borrowing from its input buffer.
#[derive(Debug, Clone)]
pub struct Sarc<'a> {
    entries: Vec<SarcEntry<'a>>,
    big_endian: bool,
}

impl<'a> Sarc<'a> {
    /// Parse and validate an archive. Member data is not copied.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, CodecError> {
        if !is_sarc(bytes) {
            return Err(malformed("missing SARC magic"));
        }
        let bom = bytes
            .get(6..8)
            .ok_or_else(|| malformed("header truncated"))?;
        let big_endian = match bom {
            [0xFF, 0xFE] => false,
            [0xFE, 0xFF] => true,
            _ => return Err(malformed(format!("invalid byte-order mark {bom:02x?}"))),
        };
        let reader = Reader { bytes, big_endian };

        let header_len = usize::from(reader.u16(4)?);
        if header_len != SARC_HEADER_LEN {
            return Err(malformed(format!("unexpected header size {header_len:#x}")));
        }
        let data_offset = reader.u32(0x0C)? as usize;

        let sfat = header_len;
        reader.expect_magic(sfat, SFAT_MAGIC)?;
        let node_count = usize::from(reader.u16(sfat + 6)?);
        let nodes = sfat + SFAT_HEADER_LEN;

        let sfnt = nodes + node_count * SFAT_NODE_LEN;
        reader.expect_magic(sfnt, SFNT_MAGIC)?;
        let names = sfnt + SFNT_HEADER_LEN;

        let mut entries = Vec::with_capacity(node_count);
        for index in 0..node_count {
            let node = nodes + index * SFAT_NODE_LEN;
            let attributes = reader.u32(node + 4)?;
            let begin = reader.u32(node + 8)? as usize;
            let end = reader.u32(node + 12)? as usize;

            if attributes & NAME_FLAG == 0 {
                return Err(malformed(format!("node {index} has no name")));
            }
            let name_offset = names + (attributes & 0xFFFF) as usize * 4;
            let name = read_name(bytes, name_offset)?;

            if end < begin {
                return Err(malformed(format!("member {name} ends before it begins")));
            }
            let data = reader.slice(data_offset + begin, end - begin)?;
            entries.push(SarcEntry { name, data });
        }

        Ok(Self {
            entries,
            big_endian,
        })
    }

    /// Iterate `(name, bytes)` pairs in node order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a [u8])> + '_ {
        self.entries.iter().map(|entry| (entry.name, entry.data))
    }

    pub fn entries(&self) -> &[SarcEntry<'a>] {
        &self.entries
    }

    /// Member bytes by exact name.
    pub fn get(&self, name: &str) -> Option<&'a [u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }
}

fn read_name(bytes: &[u8], offset: usize) -> Result<&str, CodecError> {
    let tail = bytes
        .get(offset..)
        .ok_or_else(|| malformed(format!("name offset {offset:#x} out of bounds")))?;
    let len = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| malformed(format!("unterminated name at {offset:#x}")))?;
    std::str::from_utf8(&tail[..len])
        .map_err(|_| malformed(format!("name at {offset:#x} is not UTF-8")))
}

/// Builds little-endian SARC archives.
#[derive(Debug, Clone, Default)]
pub struct SarcWriter {
    files: BTreeMap<String, Vec<u8>>,
}

impl SarcWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member.
    pub fn add(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.files.insert(name.into(), data.into());
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Serialize the archive. Nodes are sorted by name hash.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut files: Vec<(u32, &str, &[u8])> = self
            .files
            .iter()
            .map(|(name, data)| (name_hash(name, HASH_KEY), name.as_str(), data.as_slice()))
            .collect();
        files.sort_by_key(|(hash, name, _)| (*hash, *name));

        let mut name_table = Vec::new();
        let mut name_offsets = Vec::with_capacity(files.len());
        for (_, name, _) in &files {
            name_offsets.push(name_table.len() / 4);
            name_table.extend_from_slice(name.as_bytes());
            name_table.push(0);
            pad_to(&mut name_table, 4);
        }

        let mut data = Vec::new();
        let mut ranges = Vec::with_capacity(files.len());
        for (_, _, bytes) in &files {
            pad_to(&mut data, DATA_ALIGNMENT);
            let begin = data.len();
            data.extend_from_slice(bytes);
            ranges.push((begin, data.len()));
        }

        let tables_end = SARC_HEADER_LEN
            + SFAT_HEADER_LEN
            + files.len() * SFAT_NODE_LEN
            + SFNT_HEADER_LEN
            + name_table.len();
        let data_offset = tables_end.next_multiple_of(DATA_ALIGNMENT);
        let file_size = data_offset + data.len();

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(SARC_MAGIC);
        out.extend_from_slice(&(SARC_HEADER_LEN as u16).to_le_bytes());
        out.extend_from_slice(&[0xFF, 0xFE]);
        out.extend_from_slice(&(file_size as u32).to_le_bytes());
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());
        out.extend_from_slice(&SARC_VERSION.to_le_bytes());
        out.extend_from_slice(&[0, 0]);

        out.extend_from_slice(SFAT_MAGIC);
        out.extend_from_slice(&(SFAT_HEADER_LEN as u16).to_le_bytes());
        out.extend_from_slice(&(files.len() as u16).to_le_bytes());
        out.extend_from_slice(&HASH_KEY.to_le_bytes());
        for ((hash, _, _), (name_offset, (begin, end))) in
            files.iter().zip(name_offsets.iter().zip(&ranges))
        {
            out.extend_from_slice(&hash.to_le_bytes());
            out.extend_from_slice(&(NAME_FLAG | (*name_offset as u32 & 0xFFFF)).to_le_bytes());
            out.extend_from_slice(&(*begin as u32).to_le_bytes());
            out.extend_from_slice(&(*end as u32).to_le_bytes());
        }

        out.extend_from_slice(SFNT_MAGIC);
        out.extend_from_slice(&(SFNT_HEADER_LEN as u16).to_le_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&name_table);
        pad_to(&mut out, DATA_ALIGNMENT);
        out.extend_from_slice(&data);
        out
    }
}

fn pad_to(buf: &mut Vec<u8>, alignment: usize) {
    let padded = buf.len().next_multiple_of(alignment);
    buf.resize(padded, 0);
}
