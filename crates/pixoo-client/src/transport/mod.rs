//! Transport backends for the SPP byte stream.
//!
//! The device looks like a serial port, not a socket: commands flow one
//! way and the client never reads.  Everything above this module only
//! needs "give me a fresh writable stream", which is what [`Dialer`]
//! expresses.  One dial is one transport session; after a write error the
//! connection manager drops the stream and dials again.
//!
//! Two backends are provided:
//!
//! - [`RfcommDialer`] opens a bound RFCOMM serial device node (e.g.
//!   `/dev/rfcomm0`, created with `rfcomm bind <dev> <bdaddr>`).  This is
//!   the real-hardware path.
//! - [`TcpDialer`] connects to a `host:port` target, for display
//!   emulators and development without a panel nearby.
//!
//! Integration tests script their own dialer over in-memory mock streams.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;

/// Opens fresh transport sessions to the device.
///
/// Implementations hold the address; the connection manager decides when
/// to (re)dial and owns the resulting stream exclusively.
#[async_trait]
pub trait Dialer: Send {
    /// Stream type produced by a successful dial.
    type Stream: AsyncWrite + Unpin + Send;

    /// Opens a fresh session.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the device is unreachable;
    /// the caller treats every dial error as transient and retries.
    async fn dial(&mut self) -> io::Result<Self::Stream>;

    /// Human-readable dial target for log messages.
    fn describe(&self) -> String;
}

/// Dialer for a bound RFCOMM serial device node.
#[derive(Debug, Clone)]
pub struct RfcommDialer {
    device: PathBuf,
}

impl RfcommDialer {
    /// `device` is the node path, e.g. `/dev/rfcomm0`.
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

#[async_trait]
impl Dialer for RfcommDialer {
    type Stream = File;

    // Write-only: the panel never sends anything back on the SPP channel.
    async fn dial(&mut self) -> io::Result<File> {
        OpenOptions::new().write(true).open(&self.device).await
    }

    fn describe(&self) -> String {
        self.device.display().to_string()
    }
}

/// Dialer for a TCP-attached display emulator.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    addr: String,
}

impl TcpDialer {
    /// `addr` is a `host:port` pair.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&mut self) -> io::Result<TcpStream> {
        TcpStream::connect(&self.addr).await
    }

    fn describe(&self) -> String {
        self.addr.clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfcomm_dialer_describes_device_path() {
        let dialer = RfcommDialer::new("/dev/rfcomm0");
        assert_eq!(dialer.describe(), "/dev/rfcomm0");
    }

    #[test]
    fn test_tcp_dialer_describes_address() {
        let dialer = TcpDialer::new("127.0.0.1:7777");
        assert_eq!(dialer.describe(), "127.0.0.1:7777");
    }

    #[tokio::test]
    async fn test_rfcomm_dial_missing_node_returns_io_error() {
        // Arrange: a node path that cannot exist
        let mut dialer = RfcommDialer::new("/nonexistent/rfcomm99");

        // Act
        let result = dialer.dial().await;

        // Assert
        assert!(result.is_err(), "dialing a missing node must fail");
    }

    #[tokio::test]
    async fn test_tcp_dial_reaches_local_listener() {
        // Arrange: a real listener on an ephemeral port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut dialer = TcpDialer::new(addr.to_string());

        // Act
        let result = dialer.dial().await;

        // Assert
        assert!(result.is_ok(), "dial to a live listener must succeed");
    }
}
