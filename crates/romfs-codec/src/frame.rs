//! # Frame Header Inspection
//!
//! Reads the two facts the rest of the workspace needs from a zstd frame,
//! the decompressed content size and the dictionary id, straight from the
//! header bytes. Nothing is decompressed.
//!
//! ## Header Layout
//!
//! ```text
//! offset 0   magic                u32 LE  0xFD2FB528
//! offset 4   frame descriptor     u8
//!            window descriptor    u8      only when single-segment is clear
//!            dictionary id        0/1/2/4 bytes (descriptor bits 0-1)
//!            content size         1/2/4/8 bytes (descriptor bits 6-7)
//! ```
//!
//! Asset frames always carry their content size, so content-size class 0 is
//! read as a one-byte literal. Class 3 (an 8-byte size) is rejected.

use crate::error::FrameError;

/// zstd frame magic, little-endian at offset 0.
pub const ZSTD_MAGIC: u32 = 0xFD2F_B528;

/// The longest header prefix [`inspect()`] ever reads.
pub const MAX_HEADER_LEN: usize = 14;

const DESCRIPTOR_OFFSET: usize = 4;
const SINGLE_SEGMENT_FLAG: u8 = 0x20;

/// Size and dictionary facts read from a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Exact number of bytes the frame decompresses to.
    pub decompressed_size: usize,
    /// Dictionary the frame was compressed with, if any.
    pub dictionary_id: Option<u32>,
}

/// Returns `true` when the buffer starts with the zstd frame magic.
pub fn is_compressed(buffer: &[u8]) -> bool {
    buffer
        .get(..4)
        .map(|magic| u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]) == ZSTD_MAGIC)
        .unwrap_or(false)
}

/// Inspect a zstd frame header.
///
/// Returns `Ok(None)` when the buffer is not a zstd frame. A buffer that has
/// the magic but ends before a header field is reported as
/// [`FrameError::Truncated`]. Only the first [`MAX_HEADER_LEN`] bytes are
/// ever read, so a header prefix is enough.
pub fn inspect(buffer: &[u8]) -> Result<Option<FrameHeader>, FrameError> {
    if !is_compressed(buffer) {
        return Ok(None);
    }

    let descriptor = read_le(buffer, DESCRIPTOR_OFFSET, 1)? as u8;
    let size_class = descriptor >> 6;
    if size_class == 3 {
        return Err(FrameError::SizeTooLarge);
    }

    let window_len = usize::from(descriptor & SINGLE_SEGMENT_FLAG == 0);
    let dictionary_width = match descriptor & 0b11 {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 4,
    };

    let dictionary_offset = DESCRIPTOR_OFFSET + 1 + window_len;
    let dictionary_id = match dictionary_width {
        0 => None,
        width => Some(read_le(buffer, dictionary_offset, width)? as u32),
    };

    let size_offset = dictionary_offset + dictionary_width;
    let decompressed_size = match size_class {
        0 => read_le(buffer, size_offset, 1)?,
        1 => read_le(buffer, size_offset, 2)? + 256,
        _ => read_le(buffer, size_offset, 4)?,
    };

    Ok(Some(FrameHeader {
        decompressed_size: decompressed_size as usize,
        dictionary_id,
    }))
}

fn read_le(buffer: &[u8], offset: usize, width: usize) -> Result<u64, FrameError> {
    let bytes = buffer
        .get(offset..offset + width)
        .ok_or(FrameError::Truncated {
            needed: offset + width,
            available: buffer.len(),
        })?;
    Ok(bytes
        .iter()
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}
