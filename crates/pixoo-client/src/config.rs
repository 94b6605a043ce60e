//! TOML configuration for the client binary.
//!
//! The protocol itself needs no persisted state; this file only spares the
//! user retyping the device address and retry tuning on every launch.
//! Example:
//!
//! ```toml
//! log_level = "debug"
//!
//! [device]
//! address = "/dev/rfcomm0"
//! transport = "rfcomm"
//!
//! [retry]
//! backoff_ms = 1000
//! settle_ms = 1000
//! max_retries = 5
//! ```
//!
//! Every field has a default, so a missing file or an empty one yields a
//! working configuration; `max_retries` left unset means a send never
//! gives up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::RetryPolicy;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration for the binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Which transport backend to dial and where.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// RFCOMM node path or `host:port`, depending on `transport`.
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_transport")]
    pub transport: TransportKind,
}

/// Transport backend selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Bound RFCOMM serial device node.
    Rfcomm,
    /// TCP display emulator.
    Tcp,
}

/// Reconnect and retry tuning, in file-friendly millisecond fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Absent means retry until delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl RetryConfig {
    /// Converts the file representation into the runtime policy.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            backoff: Duration::from_millis(self.backoff_ms),
            settle: Duration::from_millis(self.settle_ms),
            max_retries: self.max_retries,
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_address() -> String {
    "/dev/rfcomm0".to_string()
}
fn default_transport() -> TransportKind {
    TransportKind::Rfcomm
}
fn default_backoff_ms() -> u64 {
    1000
}
fn default_settle_ms() -> u64 {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            device: DeviceConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            transport: default_transport(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_ms: default_backoff_ms(),
            settle_ms: default_settle_ms(),
            max_retries: None,
        }
    }
}

/// Loads the configuration, returning `ClientConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_rfcomm_node() {
        // Arrange / Act
        let cfg = ClientConfig::default();

        // Assert
        assert_eq!(cfg.device.address, "/dev/rfcomm0");
        assert_eq!(cfg.device.transport, TransportKind::Rfcomm);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_default_retry_config_matches_runtime_default() {
        let policy = RetryConfig::default().to_policy();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        // Arrange
        let mut cfg = ClientConfig::default();
        cfg.device.address = "192.168.1.40:7777".to_string();
        cfg.device.transport = TransportKind::Tcp;
        cfg.retry.max_retries = Some(3);

        // Act
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ClientConfig = toml::from_str(&text).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let cfg: ClientConfig = toml::from_str("").expect("empty file is valid");
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_retry_section_keeps_other_defaults() {
        // Arrange
        let text = r#"
[retry]
backoff_ms = 250
"#;

        // Act
        let cfg: ClientConfig = toml::from_str(text).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.retry.backoff_ms, 250);
        assert_eq!(cfg.retry.settle_ms, 1000);
        assert_eq!(cfg.retry.max_retries, None);
    }

    #[test]
    fn test_unset_max_retries_is_omitted_from_toml() {
        let text = toml::to_string_pretty(&ClientConfig::default()).expect("serialize");
        assert!(
            !text.contains("max_retries"),
            "None max_retries must be omitted"
        );
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<ClientConfig, toml::de::Error> = toml::from_str("[[[ not toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file_returns_defaults() {
        let cfg = load_config(Path::new("/nonexistent/pixoo/config.toml"))
            .expect("missing file must not be an error");
        assert_eq!(cfg, ClientConfig::default());
    }
}
