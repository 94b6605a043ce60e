//! The `Pixoo` facade: the surface content producers talk to.
//!
//! A producer holds exactly one [`Pixoo`] value and calls draw and
//! settings commands on it; the facade encodes, frames, and pushes bytes
//! through the connection manager in order.  Nothing here is global -
//! construct a client, pass it where it is needed.
//!
//! Encoding problems (a non-square image) surface synchronously before a
//! single byte is written, so a failed draw call has no device-visible
//! side effects.  Transport trouble is invisible at this level unless a
//! finite retry budget runs out.

use thiserror::Error;
use tracing::info;

use pixoo_core::{
    assemble, encode, encode_frame, static_block, EncodedImage, ImageError, Opcode, Rgb, RgbImage,
};

use crate::connection::{ConnectionError, ConnectionManager, ConnectionState, RetryPolicy};
use crate::transport::{Dialer, RfcommDialer};

/// Errors surfaced by draw and settings commands.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The supplied image cannot be encoded; nothing was sent.
    #[error("image rejected: {0}")]
    Image(#[from] ImageError),

    /// A frame was dropped after exhausting a finite retry budget.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Built-in display modes selectable with [`Pixoo::set_box_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BoxMode {
    /// Clock face.
    Clock = 0,
    /// Temperature display.
    Temperature = 1,
    /// Solid colour (see [`Pixoo::set_color`]).
    Color = 2,
    /// Device-specific effects.
    Special = 3,
}

/// One animation frame: a square image and how long it stays on screen.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub image: RgbImage,
    pub delay_ms: u16,
}

/// Client handle for one panel.
///
/// All commands serialize through the owned connection manager; `&mut
/// self` makes that explicit at the type level.
pub struct Pixoo<D: Dialer> {
    conn: ConnectionManager<D>,
}

impl Pixoo<RfcommDialer> {
    /// Client over a bound RFCOMM device node such as `/dev/rfcomm0`.
    pub fn rfcomm(device: impl Into<std::path::PathBuf>, policy: RetryPolicy) -> Self {
        Self::new(RfcommDialer::new(device), policy)
    }
}

impl<D: Dialer> Pixoo<D> {
    pub fn new(dialer: D, policy: RetryPolicy) -> Self {
        Self {
            conn: ConnectionManager::new(dialer, policy),
        }
    }

    /// Current transport state, for status displays and tests.
    pub fn state(&self) -> ConnectionState {
        self.conn.state()
    }

    /// Establishes the connection up front.
    ///
    /// Optional - the first send connects lazily - but calling it at
    /// startup keeps the settle delay out of the first draw.
    pub async fn connect(&mut self) {
        self.conn.connect().await;
    }

    /// Sets panel brightness (0 is off, 100 is full).
    ///
    /// # Errors
    ///
    /// See [`ClientError::Connection`].
    pub async fn set_brightness(&mut self, level: u8) -> Result<(), ClientError> {
        self.send(Opcode::SetBrightness, &[level]).await
    }

    /// Selects a built-in display mode.
    ///
    /// `visual` and `submode` pick variants within the mode; 0 is the
    /// device default for both.
    ///
    /// # Errors
    ///
    /// See [`ClientError::Connection`].
    pub async fn set_box_mode(
        &mut self,
        mode: BoxMode,
        visual: u8,
        submode: u8,
    ) -> Result<(), ClientError> {
        self.send(Opcode::SetBoxMode, &[mode as u8, visual, submode])
            .await
    }

    /// Fills the panel with a single colour.
    ///
    /// # Errors
    ///
    /// See [`ClientError::Connection`].
    pub async fn set_color(&mut self, color: Rgb) -> Result<(), ClientError> {
        self.send(Opcode::SetColor, &[color.r, color.g, color.b])
            .await
    }

    /// Draws a still picture.
    ///
    /// Accepts any square image; it is resampled to 16×16 and sent as one
    /// unchunked command.
    ///
    /// # Errors
    ///
    /// [`ClientError::Image`] when the image is not square (nothing is
    /// sent), or [`ClientError::Connection`] on budget exhaustion.
    pub async fn draw_image(&mut self, image: &RgbImage) -> Result<(), ClientError> {
        let encoded = encode(image)?;
        self.send(Opcode::DrawPicture, &static_block(&encoded)).await
    }

    /// Plays an animation with per-frame delays.
    ///
    /// Frames are encoded up front, so an invalid image anywhere in the
    /// sequence fails the whole call before any chunk is sent.
    ///
    /// # Errors
    ///
    /// [`ClientError::Image`] when any frame is not square, or
    /// [`ClientError::Connection`] on budget exhaustion mid-sequence.
    pub async fn draw_animation(&mut self, frames: &[AnimationFrame]) -> Result<(), ClientError> {
        let encoded = frames
            .iter()
            .map(|f| Ok((encode(&f.image)?, f.delay_ms)))
            .collect::<Result<Vec<_>, ImageError>>()?;
        self.send_animation(&encoded).await
    }

    /// Plays an ordered image sequence at a uniform delay.
    ///
    /// This is the entry point for producers that enumerate frames
    /// themselves - a directory of stills, a decoded GIF.
    ///
    /// # Errors
    ///
    /// Same as [`draw_animation`](Self::draw_animation).
    pub async fn draw_sequence(
        &mut self,
        images: &[RgbImage],
        delay_ms: u16,
    ) -> Result<(), ClientError> {
        let encoded = images
            .iter()
            .map(|img| Ok((encode(img)?, delay_ms)))
            .collect::<Result<Vec<_>, ImageError>>()?;
        self.send_animation(&encoded).await
    }

    async fn send_animation(&mut self, frames: &[(EncodedImage, u16)]) -> Result<(), ClientError> {
        let chunks = assemble(frames);
        info!(frames = frames.len(), chunks = chunks.len(), "sending animation");
        for chunk in chunks {
            self.send(Opcode::DrawAnimation, &chunk.into_payload())
                .await?;
        }
        Ok(())
    }

    async fn send(&mut self, opcode: Opcode, args: &[u8]) -> Result<(), ClientError> {
        self.conn.send_frame(&encode_frame(opcode, args)).await?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
