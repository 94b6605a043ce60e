//! pixoo-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The client drives a Divoom Pixoo 16×16 LED matrix over a Bluetooth
//! serial (SPP/RFCOMM) stream.  Content producers - a game loop, a GIF
//! decoder, a screen grabber - hand it decoded pixels or raw command
//! arguments; this crate owns everything from there to the wire:
//!
//! 1. `pixoo-core` encodes pixels into palette frames and command frames.
//! 2. [`connection`] keeps the unreliable stream alive, reconnecting with
//!    a fixed backoff whenever a write hits a reset.
//! 3. [`transport`] supplies the actual byte stream behind a small dialer
//!    trait, so tests can script failures without Bluetooth hardware.
//! 4. [`client::Pixoo`] is the facade producers talk to: draw a picture,
//!    play an animation, set brightness, colour, or a built-in mode.

/// Command facade over the connection manager.
pub mod client;

/// TOML configuration for the binary.
pub mod config;

/// Connection lifecycle: states, retry policy, reconnect-on-failure.
pub mod connection;

/// Transport backends behind the `Dialer` seam.
pub mod transport;

pub use client::{AnimationFrame, BoxMode, ClientError, Pixoo};
pub use connection::{ConnectionManager, ConnectionState, RetryPolicy};
pub use transport::{Dialer, RfcommDialer, TcpDialer};
