//! Wire protocol for the Pixoo SPP command channel.

pub mod animation;
pub mod frame;

pub use animation::{assemble, frame_block, static_block, Chunk, MAX_CHUNK_DATA};
pub use frame::{encode_frame, Opcode};
