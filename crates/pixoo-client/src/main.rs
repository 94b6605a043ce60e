//! Pixoo client demo binary.
//!
//! Connects to the panel and runs a short command tour: brightness, solid
//! colour, a generated checkerboard still, and a small generated
//! animation.  All pixel content is produced in code - decoding image
//! files is a producer's job, not this client's.
//!
//! Usage:
//!
//! ```text
//! pixoo-client [address]
//! ```
//!
//! `address` overrides the configured device target (an RFCOMM node path,
//! or `host:port` when the config selects the TCP transport).  The config
//! file is read from `$PIXOO_CONFIG` or `./pixoo.toml`; a missing file
//! falls back to defaults.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pixoo_client::config::{load_config, TransportKind};
use pixoo_client::{BoxMode, Dialer, Pixoo, TcpDialer};
use pixoo_core::{Rgb, RgbImage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("PIXOO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("pixoo.toml"));
    let config = load_config(&config_path)?;

    // Initialise structured logging; RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.device.address.clone());
    let policy = config.retry.to_policy();

    info!(%address, "Pixoo client starting");

    match config.device.transport {
        TransportKind::Rfcomm => run(Pixoo::rfcomm(address, policy)).await,
        TransportKind::Tcp => run(Pixoo::new(TcpDialer::new(address), policy)).await,
    }
}

async fn run<D: Dialer>(mut pixoo: Pixoo<D>) -> anyhow::Result<()> {
    pixoo.connect().await;

    pixoo.set_brightness(64).await?;
    pixoo.set_box_mode(BoxMode::Color, 0, 0).await?;
    pixoo.set_color(Rgb::new(0, 0, 64)).await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    info!("drawing checkerboard");
    pixoo.draw_image(&checkerboard()).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    info!("playing sweep animation");
    pixoo.draw_sequence(&sweep_frames(), 120).await?;

    info!("demo complete");
    Ok(())
}

/// Two-colour checkerboard test card.
fn checkerboard() -> RgbImage {
    let pixels = (0..256usize)
        .map(|i| {
            if (i % 16 + i / 16) % 2 == 0 {
                Rgb::new(255, 140, 0)
            } else {
                Rgb::new(20, 20, 20)
            }
        })
        .collect();
    RgbImage::new(16, 16, pixels).expect("buffer matches 16x16")
}

/// A bright column sweeping left to right across a dark field.
fn sweep_frames() -> Vec<RgbImage> {
    (0..16usize)
        .map(|col| {
            let pixels = (0..256usize)
                .map(|i| {
                    if i % 16 == col {
                        Rgb::new(0, 255, 180)
                    } else {
                        Rgb::new(10, 10, 30)
                    }
                })
                .collect();
            RgbImage::new(16, 16, pixels).expect("buffer matches 16x16")
        })
        .collect()
}
