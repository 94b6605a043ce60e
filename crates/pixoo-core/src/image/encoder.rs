//! Palette extraction and index bit packing.
//!
//! The device does not accept raw RGB.  Each frame is sent as a colour
//! palette followed by one palette index per pixel, packed at the smallest
//! bit width that can address the palette:
//!
//! ```text
//! pixels:   [red, red, blue, red, ..]          (256 of them)
//! palette:  [red, blue]                        (first-occurrence order)
//! indices:  [0, 0, 1, 0, ..]
//! packed:   indices at 1 bit each, LSB-first   (32 bytes)
//! ```
//!
//! # Bit order
//!
//! Packing is FIFO through a bit accumulator: each index enters at the high
//! end, and whenever eight or more bits are buffered the **lowest** eight
//! are emitted as the next output byte.  The first pixel's index therefore
//! occupies the low bits of the first byte.  The device firmware unpacks in
//! this exact order; MSB-first or byte-aligned packing renders garbage.

use crate::image::{ImageError, Rgb, RgbImage, MATRIX_PIXELS, MATRIX_SIZE};

/// A palette-indexed encoding of one 16×16 frame.
///
/// Produced by [`encode`]; consumed by the animation assembler, which lays
/// palette bytes and packed pixels out behind a frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    palette: Vec<Rgb>,
    packed: Vec<u8>,
}

impl EncodedImage {
    /// Number of distinct colours in the palette (1..=256).
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    /// Bits per packed pixel index, minimum 1.
    pub fn bit_width(&self) -> u32 {
        bit_width_for(self.palette.len())
    }

    /// Palette in first-occurrence order.
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// Palette as a flat `R,G,B,R,G,B,..` byte sequence.
    pub fn palette_bytes(&self) -> Vec<u8> {
        self.palette
            .iter()
            .flat_map(|c| [c.r, c.g, c.b])
            .collect()
    }

    /// The bit-packed pixel indices.
    pub fn packed_pixels(&self) -> &[u8] {
        &self.packed
    }
}

/// Encodes a square image into a palette plus packed indices.
///
/// Images whose side is not 16 are first resampled to 16×16 with
/// nearest-neighbour sampling, so producers may hand over any square size.
///
/// # Errors
///
/// Returns [`ImageError::NotSquare`] when the source is not square.  This
/// is the only failure: a square image always encodes.
pub fn encode(image: &RgbImage) -> Result<EncodedImage, ImageError> {
    if image.width() != image.height() {
        return Err(ImageError::NotSquare {
            width: image.width(),
            height: image.height(),
        });
    }

    let resampled;
    let image = if image.width() == MATRIX_SIZE {
        image
    } else {
        resampled = image.resample_nearest(MATRIX_SIZE);
        &resampled
    };

    // First-occurrence palette scan, row-major.  A linear probe is fine at
    // 256 pixels and keeps insertion order without a side table.
    let mut palette: Vec<Rgb> = Vec::new();
    let mut indices = [0u16; MATRIX_PIXELS];
    for (slot, &px) in indices.iter_mut().zip(image.pixels()) {
        *slot = match palette.iter().position(|&c| c == px) {
            Some(i) => i as u16,
            None => {
                palette.push(px);
                (palette.len() - 1) as u16
            }
        };
    }

    let packed = pack_indices(&indices, bit_width_for(palette.len()));
    Ok(EncodedImage { palette, packed })
}

/// Smallest bit width addressing `palette_len` entries, minimum 1.
fn bit_width_for(palette_len: usize) -> u32 {
    if palette_len <= 1 {
        1
    } else {
        (palette_len as u32 - 1).ilog2() + 1
    }
}

/// Packs fixed-width indices LSB-first through a FIFO bit accumulator.
fn pack_indices(indices: &[u16], bit_width: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((indices.len() * bit_width as usize).div_ceil(8));
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &idx in indices {
        acc |= u32::from(idx) << bits;
        bits += bit_width;
        while bits >= 8 {
            out.push((acc & 0xFF) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    // 256 indices at any bit width fill whole bytes, but flush defensively
    // for other lengths.
    if bits > 0 {
        out.push((acc & 0xFF) as u8);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Reverses [`pack_indices`]: reads `count` indices of `bit_width` bits
    /// from the low end of the byte stream.
    fn unpack_indices(packed: &[u8], bit_width: u32, count: usize) -> Vec<u16> {
        let mut out = Vec::with_capacity(count);
        let mut acc: u32 = 0;
        let mut bits: u32 = 0;
        let mut bytes = packed.iter();
        for _ in 0..count {
            while bits < bit_width {
                acc |= u32::from(*bytes.next().expect("packed stream too short")) << bits;
                bits += 8;
            }
            out.push((acc & ((1 << bit_width) - 1)) as u16);
            acc >>= bit_width;
            bits -= bit_width;
        }
        out
    }

    /// Builds a 16×16 image whose first `n` pixels cycle through `n`
    /// distinct colours and whose remainder repeats the first colour.
    fn image_with_colors(n: usize) -> RgbImage {
        let pixels = (0..MATRIX_PIXELS)
            .map(|i| {
                let c = if i < n { i } else { 0 };
                Rgb::new((c % 256) as u8, (c / 256) as u8, 0)
            })
            .collect();
        RgbImage::new(MATRIX_SIZE, MATRIX_SIZE, pixels).unwrap()
    }

    // ── Palette ───────────────────────────────────────────────────────────────

    #[test]
    fn test_all_red_image_encodes_to_single_entry_palette() {
        // Arrange
        let img = RgbImage::filled(16, Rgb::new(255, 0, 0));

        // Act
        let enc = encode(&img).expect("square image must encode");

        // Assert: one palette entry, 1-bit indices, 256 zero bits = 32 bytes
        assert_eq!(enc.palette_len(), 1);
        assert_eq!(enc.palette_bytes(), vec![255, 0, 0]);
        assert_eq!(enc.bit_width(), 1);
        assert_eq!(enc.packed_pixels(), &[0u8; 32][..]);
    }

    #[test]
    fn test_palette_preserves_first_occurrence_order() {
        // Arrange: blue appears before red in row-major order
        let mut pixels = vec![Rgb::new(0, 0, 255); MATRIX_PIXELS];
        pixels[1] = Rgb::new(255, 0, 0);
        pixels[2] = Rgb::new(0, 0, 255); // repeat must not re-enter the palette
        let img = RgbImage::new(16, 16, pixels).unwrap();

        // Act
        let enc = encode(&img).unwrap();

        // Assert
        assert_eq!(enc.palette(), &[Rgb::new(0, 0, 255), Rgb::new(255, 0, 0)]);
    }

    #[test]
    fn test_palette_counts_distinct_colors() {
        for n in [1, 2, 3, 4, 5, 17, 64, 256] {
            let enc = encode(&image_with_colors(n)).unwrap();
            assert_eq!(enc.palette_len(), n, "expected {n} palette entries");
        }
    }

    // ── Bit width ─────────────────────────────────────────────────────────────

    #[test]
    fn test_bit_width_is_ceil_log2_with_minimum_one() {
        let cases = [
            (1, 1),
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 3),
            (8, 3),
            (9, 4),
            (16, 4),
            (17, 5),
            (128, 7),
            (129, 8),
            (256, 8),
        ];
        for (palette_len, expected) in cases {
            assert_eq!(
                bit_width_for(palette_len),
                expected,
                "palette_len {palette_len}"
            );
        }
    }

    #[test]
    fn test_packed_length_matches_bit_width() {
        for n in [1, 2, 5, 17, 256] {
            let enc = encode(&image_with_colors(n)).unwrap();
            let expected = (MATRIX_PIXELS * enc.bit_width() as usize).div_ceil(8);
            assert_eq!(enc.packed_pixels().len(), expected, "{n} colours");
        }
    }

    // ── Packing order ─────────────────────────────────────────────────────────

    #[test]
    fn test_pack_indices_is_lsb_first() {
        // Indices 0,1,2,3 at 2 bits: 0b11_10_01_00 = 0xE4, first index in
        // the low bits.
        let packed = pack_indices(&[0, 1, 2, 3], 2);
        assert_eq!(packed, vec![0xE4]);
    }

    #[test]
    fn test_pack_indices_spanning_byte_boundary() {
        // 3-bit indices 5,6,7: accumulator 0b111_110_101, low byte
        // 0b11110101 = 0xF5, leftover high bit 1 -> 0x01.
        let packed = pack_indices(&[5, 6, 7], 3);
        assert_eq!(packed, vec![0xF5, 0x01]);
    }

    #[test]
    fn test_packed_indices_round_trip() {
        for n in [2, 3, 5, 17, 64, 256] {
            // Arrange
            let img = image_with_colors(n);
            let enc = encode(&img).unwrap();

            // Act
            let indices = unpack_indices(enc.packed_pixels(), enc.bit_width(), MATRIX_PIXELS);

            // Assert: every index resolves back to the source pixel
            for (i, (&idx, &px)) in indices.iter().zip(img.pixels()).enumerate() {
                assert_eq!(enc.palette()[idx as usize], px, "pixel {i}, {n} colours");
            }
        }
    }

    // ── Shape handling ────────────────────────────────────────────────────────

    #[test]
    fn test_non_square_image_is_rejected() {
        let img = RgbImage::new(16, 8, vec![Rgb::new(0, 0, 0); 128]).unwrap();
        assert_eq!(
            encode(&img),
            Err(ImageError::NotSquare {
                width: 16,
                height: 8
            })
        );
    }

    #[test]
    fn test_oversized_image_is_downscaled() {
        // Arrange: 32x32 made of uniform 2x2 blocks in two colours,
        // checkerboard at block level
        let pixels = (0..32 * 32)
            .map(|i| {
                let (x, y) = (i % 32, i / 32);
                if ((x / 2) + (y / 2)) % 2 == 0 {
                    Rgb::new(255, 255, 255)
                } else {
                    Rgb::new(0, 0, 0)
                }
            })
            .collect();
        let img = RgbImage::new(32, 32, pixels).unwrap();

        // Act
        let enc = encode(&img).unwrap();

        // Assert: both colours survive the resample, 1 bit per pixel
        assert_eq!(enc.palette_len(), 2);
        assert_eq!(enc.packed_pixels().len(), 32);
    }

    #[test]
    fn test_small_image_is_upscaled() {
        let img = RgbImage::filled(8, Rgb::new(0, 128, 0));
        let enc = encode(&img).unwrap();
        assert_eq!(enc.palette_len(), 1);
        assert_eq!(enc.packed_pixels().len(), 32);
    }
}
