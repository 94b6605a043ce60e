//! Connection lifecycle for the SPP stream.
//!
//! The Bluetooth link drops constantly: the panel powers off, wanders out
//! of range, or simply resets the stream mid-write.  The design goal is
//! eventual delivery, not loud failure - a producer keeps calling draw
//! commands and the manager quietly repairs the link underneath.
//!
//! State machine:
//!
//! ```text
//! Disconnected ──connect()──> Connecting ──dial ok + settle──> Connected
//!      ^                                                          │
//!      └───────────────── write error (reset) ────────────────────┘
//! ```
//!
//! `connect()` retries the dial until it succeeds, sleeping a fixed
//! backoff between attempts; the transport additionally needs a settle
//! period of quiescence after opening before it accepts the first write.
//! `send_frame` marks the connection `Disconnected` on any write error,
//! reconnects, and retries the same frame.  A single [`RetryPolicy`]
//! governs both loops; with the default unbounded budget a send blocks
//! until the frame is delivered.
//!
//! There is no explicit close: the stream lives until the process exits
//! or a write error replaces it.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::time;
use tracing::{debug, info, warn};

use crate::transport::Dialer;

/// Errors surfaced by the connection manager.
///
/// Transient transport failures are handled internally and never appear
/// here; the only way a send fails is by running out of a finite budget.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The frame was dropped after the configured number of reconnect
    /// cycles all ended in write errors.
    #[error("frame dropped after {attempts} failed write attempts")]
    RetryBudgetExhausted { attempts: u32 },
}

/// Lifecycle state of the transport link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No usable stream; the next send will dial first.
    Disconnected,
    /// A dial loop is in progress.
    Connecting,
    /// A stream is open and settled; writes go straight out.
    Connected,
}

/// Reconnect and retry tuning, shared by `connect()` and `send_frame`.
///
/// The defaults reproduce the device's documented needs: one dial attempt
/// per second and a full second of quiescence after open before the first
/// write.  `max_retries: None` means a send never gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between consecutive dial attempts.
    pub backoff: Duration,
    /// Quiescence period after the transport opens, before the first write.
    pub settle: Duration,
    /// Write retry budget per frame; `None` retries until delivered.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(1),
            settle: Duration::from_secs(1),
            max_retries: None,
        }
    }
}

/// Owns the transport stream exclusively and repairs it on failure.
///
/// Single-caller by design: the facade serializes all sends through one
/// manager.  Wrap the whole client in a mutex if several tasks must share
/// it.
pub struct ConnectionManager<D: Dialer> {
    dialer: D,
    policy: RetryPolicy,
    state: ConnectionState,
    stream: Option<D::Stream>,
}

impl<D: Dialer> ConnectionManager<D> {
    /// Creates a manager in the `Disconnected` state; nothing is dialled
    /// until [`connect`](Self::connect) or the first send.
    pub fn new(dialer: D, policy: RetryPolicy) -> Self {
        Self {
            dialer,
            policy,
            state: ConnectionState::Disconnected,
            stream: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The configured retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Dials until the transport opens, then waits out the settle period.
    ///
    /// Unavailability is treated as transient, so this future only
    /// resolves once connected.  It is an ordinary future: callers that
    /// need a bound wrap it in `tokio::time::timeout` or drop it.
    pub async fn connect(&mut self) {
        self.state = ConnectionState::Connecting;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.dialer.dial().await {
                Ok(stream) => {
                    // The panel drops writes issued too soon after open.
                    time::sleep(self.policy.settle).await;
                    self.stream = Some(stream);
                    self.state = ConnectionState::Connected;
                    info!(device = %self.dialer.describe(), attempt, "transport connected");
                    return;
                }
                Err(e) => {
                    warn!(
                        device = %self.dialer.describe(),
                        attempt,
                        error = %e,
                        "dial failed, retrying after backoff"
                    );
                    time::sleep(self.policy.backoff).await;
                }
            }
        }
    }

    /// Writes one wire frame, reconnecting and retrying on failure.
    ///
    /// Each write error marks the connection `Disconnected`, consumes one
    /// unit of the retry budget, and triggers exactly one
    /// [`connect`](Self::connect) before the next attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::RetryBudgetExhausted`] only when
    /// `max_retries` is finite and every budgeted attempt failed; the
    /// frame is dropped and the link is left `Disconnected` for the next
    /// send to repair.
    pub async fn send_frame(&mut self, frame: &[u8]) -> Result<(), ConnectionError> {
        let mut failures: u32 = 0;
        loop {
            if self.stream.is_none() {
                self.connect().await;
            }
            let Some(stream) = self.stream.as_mut() else {
                continue;
            };

            match write_frame(stream, frame).await {
                Ok(()) => {
                    debug!(bytes = frame.len(), "frame sent");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "write failed, transport reset");
                    self.stream = None;
                    self.state = ConnectionState::Disconnected;
                    failures += 1;
                    if let Some(max) = self.policy.max_retries {
                        if failures > max {
                            warn!(failures, "retry budget exhausted, dropping frame");
                            return Err(ConnectionError::RetryBudgetExhausted {
                                attempts: failures,
                            });
                        }
                    }
                }
            }
        }
    }
}

async fn write_frame<S: AsyncWriteExt + Unpin>(stream: &mut S, frame: &[u8]) -> io::Result<()> {
    stream.write_all(frame).await?;
    stream.flush().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default_matches_device_timing() {
        // Arrange / Act
        let policy = RetryPolicy::default();

        // Assert
        assert_eq!(policy.backoff, Duration::from_secs(1));
        assert_eq!(policy.settle, Duration::from_secs(1));
        assert_eq!(policy.max_retries, None);
    }

    #[test]
    fn test_new_manager_starts_disconnected() {
        // A dialer that is never used; dial() would fail if called.
        let dialer = crate::transport::RfcommDialer::new("/dev/null-rfcomm");
        let mgr = ConnectionManager::new(dialer, RetryPolicy::default());
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
    }
}
