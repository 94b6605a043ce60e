//! Frame blocks, animation buffers, and transport chunking.
//!
//! Every encoded frame is wrapped in a 7-byte header before it travels:
//!
//! ```text
//! [0xAA][size_lo][size_hi][timecode_lo][timecode_hi][0x00][palette_len]
//! [palette: 3 * palette_len][packed pixels]
//! ```
//!
//! `size` covers the header, palette, and pixels.  `timecode` is the
//! frame's cumulative display time in milliseconds: the sum of every
//! earlier frame's delay, 0 for the first frame.
//!
//! Animations concatenate all frame blocks into one buffer and split it
//! into chunks of at most [`MAX_CHUNK_DATA`] bytes, each prefixed with the
//! *total* buffer size and its index so the device can reassemble:
//!
//! ```text
//! [total_lo][total_hi][chunk_index][data: <=200]
//! ```
//!
//! A still picture skips chunking entirely - one 16×16 frame always fits a
//! single command - and instead carries a fixed 4-byte selector in front of
//! its frame block (see [`static_block`]).

use tracing::trace;

use crate::image::EncodedImage;

/// Marker byte opening every frame header.
const FRAME_MARKER: u8 = 0xAA;

/// Maximum data bytes carried by one animation chunk.
pub const MAX_CHUNK_DATA: usize = 200;

/// Selector prefix for the unchunked still-picture payload.
const PICTURE_SELECTOR: [u8; 4] = [0x00, 0x0A, 0x0A, 0x04];

/// One transport-sized slice of an assembled animation buffer.
///
/// `total_size` is the length of the whole buffer, not of this slice; the
/// device uses it together with `index` to reassemble out of one command
/// per chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    total_size: u16,
    index: u8,
    data: Vec<u8>,
}

impl Chunk {
    /// Length of the full animation buffer this chunk belongs to.
    pub fn total_size(&self) -> u16 {
        self.total_size
    }

    /// Zero-based position of this chunk in the buffer.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The carried buffer slice, at most [`MAX_CHUNK_DATA`] bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Serializes the chunk as command args: `[total_lo, total_hi, index,
    /// data..]`.
    pub fn into_payload(self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(3 + self.data.len());
        payload.extend_from_slice(&self.total_size.to_le_bytes());
        payload.push(self.index);
        payload.extend_from_slice(&self.data);
        payload
    }
}

/// Wraps one encoded frame in its timing header.
///
/// With a 256-colour palette the length byte wraps to 0; the device reads
/// the byte mod 256.
pub fn frame_block(image: &EncodedImage, timecode_ms: u16) -> Vec<u8> {
    let palette = image.palette_bytes();
    let pixels = image.packed_pixels();
    let size = 7 + palette.len() + pixels.len();

    let mut block = Vec::with_capacity(size);
    block.push(FRAME_MARKER);
    block.extend_from_slice(&(size as u16).to_le_bytes());
    block.extend_from_slice(&timecode_ms.to_le_bytes());
    block.push(0x00);
    block.push(image.palette_len() as u8);
    block.extend_from_slice(&palette);
    block.extend_from_slice(pixels);
    block
}

/// Concatenates timed frames into one buffer and splits it into chunks.
///
/// Each frame's timecode is the wrapping sum of the delays of the frames
/// before it, so the first frame always shows at 0 ms.  Chunk count is
/// `ceil(buffer_len / MAX_CHUNK_DATA)`; an empty frame list yields no
/// chunks.
pub fn assemble(frames: &[(EncodedImage, u16)]) -> Vec<Chunk> {
    let mut buffer = Vec::new();
    let mut timecode: u16 = 0;
    for (image, delay_ms) in frames {
        buffer.extend_from_slice(&frame_block(image, timecode));
        timecode = timecode.wrapping_add(*delay_ms);
    }

    debug_assert!(
        buffer.len() <= usize::from(u16::MAX),
        "animation buffer exceeds the 16-bit total-size field"
    );
    let total_size = buffer.len() as u16;

    let chunks: Vec<Chunk> = buffer
        .chunks(MAX_CHUNK_DATA)
        .enumerate()
        .map(|(i, data)| Chunk {
            total_size,
            index: i as u8,
            data: data.to_vec(),
        })
        .collect();

    trace!(
        frames = frames.len(),
        buffer_len = buffer.len(),
        chunks = chunks.len(),
        "assembled animation"
    );
    chunks
}

/// Builds the unchunked still-picture payload: the fixed selector followed
/// by a single frame block at timecode 0.
pub fn static_block(image: &EncodedImage) -> Vec<u8> {
    let block = frame_block(image, 0);
    let mut payload = Vec::with_capacity(PICTURE_SELECTOR.len() + block.len());
    payload.extend_from_slice(&PICTURE_SELECTOR);
    payload.extend_from_slice(&block);
    payload
}

// ── Tests ─────────────────────────────────────────────────────────────────────
