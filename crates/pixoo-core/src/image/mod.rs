//! Pixel buffer types for the 16×16 matrix.
//!
//! Producers (a game loop, a GIF decoder, a screen grabber) hand the client
//! decoded pixels as an [`RgbImage`]; this crate never reads files.  The
//! buffer may be any square size - the encoder resamples it to the panel's
//! native 16×16 before palette extraction.

pub mod encoder;

pub use encoder::{encode, EncodedImage};

use thiserror::Error;

/// Side length of the device matrix in pixels.
pub const MATRIX_SIZE: usize = 16;

/// Number of pixels in one encoded frame.
pub const MATRIX_PIXELS: usize = MATRIX_SIZE * MATRIX_SIZE;

/// Errors raised while constructing or encoding an image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    /// The source image is not square and cannot be shown on the panel.
    #[error("image must be square, got {width}x{height}")]
    NotSquare { width: usize, height: usize },

    /// The raw byte buffer does not match the declared dimensions.
    #[error("pixel buffer holds {actual} bytes, {expected} expected for {width}x{height}")]
    BufferSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// An RGB colour triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// An owned width×height RGB pixel buffer, row-major from the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl RgbImage {
    /// Creates an image from pre-built pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::BufferSizeMismatch`] when `pixels.len()` is not
    /// `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self, ImageError> {
        if pixels.len() != width * height {
            return Err(ImageError::BufferSizeMismatch {
                width,
                height,
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a solid single-colour square image.
    pub fn filled(size: usize, color: Rgb) -> Self {
        Self {
            width: size,
            height: size,
            pixels: vec![color; size * size],
        }
    }

    /// Creates an image from a flat `R,G,B,R,G,B,..` byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::BufferSizeMismatch`] when the buffer is not
    /// exactly `width * height * 3` bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() != width * height * 3 {
            return Err(ImageError::BufferSizeMismatch {
                width,
                height,
                expected: width * height * 3,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates an image from a flat `R,G,B,A,..` byte buffer, dropping the
    /// alpha channel.  The panel has no notion of transparency.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::BufferSizeMismatch`] when the buffer is not
    /// exactly `width * height * 4` bytes.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() != width * height * 4 {
            return Err(ImageError::BufferSizeMismatch {
                width,
                height,
                expected: width * height * 4,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel slice.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)` with the origin at the top-left.
    ///
    /// # Panics
    ///
    /// Panics when the coordinates are outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[y * self.width + x]
    }

    /// Resamples a square image to `target`×`target` with nearest-neighbour
    /// sampling.  Works in both directions; upscales repeat source pixels.
    pub(crate) fn resample_nearest(&self, target: usize) -> RgbImage {
        let mut pixels = Vec::with_capacity(target * target);
        for y in 0..target {
            let sy = y * self.height / target;
            for x in 0..target {
                let sx = x * self.width / target;
                pixels.push(self.pixel(sx, sy));
            }
        }
        RgbImage {
            width: target,
            height: target,
            pixels,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
