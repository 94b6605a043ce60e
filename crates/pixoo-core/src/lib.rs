//! # pixoo-core
//!
//! Shared library for the Pixoo SPP client containing the command frame
//! codec, the palette-based pixel encoder, and the animation assembler.
//!
//! This crate is pure data transformation: it has zero dependencies on OS
//! APIs, sockets, or an async runtime.  The `pixoo-client` crate owns the
//! Bluetooth transport and drives everything defined here.
//!
//! # How a picture reaches the panel
//!
//! The Pixoo is a 16×16 RGB LED matrix that speaks a small binary command
//! protocol over a Bluetooth serial (SPP/RFCOMM) stream.  Displaying an
//! image takes three steps, one per module:
//!
//! - **`image`** – A square [`RgbImage`] is resampled to 16×16 and encoded
//!   into a colour palette plus a bit-packed stream of palette indices
//!   ([`EncodedImage`]).  A two-colour image costs 1 bit per pixel instead
//!   of 24, which matters on a link this slow.
//!
//! - **`protocol::animation`** – Encoded frames are wrapped in per-frame
//!   timing headers and concatenated into one buffer.  Buffers larger than
//!   a single command can carry are split into indexed [`Chunk`]s that the
//!   device reassembles.
//!
//! - **`protocol::frame`** – Every command, pixel data or not, is framed as
//!   `[0x01, size, opcode, args.., checksum, 0x02]` by [`encode_frame`].

pub mod image;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `pixoo_core::RgbImage` instead of `pixoo_core::image::RgbImage`.
pub use image::{encode, EncodedImage, ImageError, Rgb, RgbImage};
pub use protocol::animation::{assemble, frame_block, static_block, Chunk, MAX_CHUNK_DATA};
pub use protocol::frame::{encode_frame, Opcode};
