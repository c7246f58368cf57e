//! Adapter runner utilities for standard main() implementations.

use argh::FromArgs;
use std::time::Duration;
use tokio::sync::watch;

use super::traits::CameraAdapter;
use crate::config::{CamConfig, ConfigError, RtspTransport};
use crate::error::CamError;

/// Standard CLI arguments for the RTSP camera adapter.
///
/// Flags override the values of the YAML file given with `--config`.
#[derive(FromArgs, Debug, Default)]
#[argh(description = "RTSP camera adapter")]
pub struct CamArgs {
    /// path to YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<String>,

    /// stream source
    #[argh(option, short = 's')]
    pub source: Option<String>,

    /// rtsp transport: tcp, udp, udp_multicast or http
    #[argh(option)]
    pub rtsp_transport: Option<RtspTransport>,

    /// camera username
    #[argh(option, short = 'u')]
    pub username: Option<String>,

    /// camera password
    #[argh(option, short = 'p')]
    pub password: Option<String>,

    /// snapshot image url
    #[argh(option, short = 'i')]
    pub snapshot_url: Option<String>,

    /// port number to enable the HTTP API (default: disabled)
    #[argh(option)]
    pub http_api: Option<u16>,

    /// ffmpeg executable used for sampled snapshots
    #[argh(option)]
    pub ffmpeg_path: Option<String>,

    /// seconds between snapshot polls (default: disabled)
    #[argh(option)]
    pub snapshot_interval: Option<u64>,
}

impl CamArgs {
    /// Resolve the final configuration: file first, then flags, then validation.
    pub fn into_config(self) -> Result<CamConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading config from: {}", path);
                CamConfig::from_file(path)?
            }
            None => CamConfig::default(),
        };

        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(transport) = self.rtsp_transport {
            config.rtsp_transport = transport;
        }
        if self.username.is_some() {
            config.username = self.username;
        }
        if self.password.is_some() {
            config.password = self.password;
        }
        if self.snapshot_url.is_some() {
            config.snapshot_url = self.snapshot_url;
        }
        if let Some(port) = self.http_api {
            config.http_api = port;
        }
        if let Some(path) = self.ffmpeg_path {
            config.ffmpeg_path = path;
        }
        if let Some(secs) = self.snapshot_interval {
            config.snapshot_interval = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Initialize logging with env_logger.
///
/// Respects RUST_LOG environment variable. Defaults to "info" level.
pub fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Drive an adapter until the shutdown signal fires.
///
/// Calls `run()`, then polls `get_snapshot()` every `snapshot_interval` if one
/// is given, and always finishes with `close()`, including when `run()` or a
/// snapshot request fails.
pub async fn run_adapter<A: CameraAdapter>(
    adapter: &A,
    snapshot_interval: Option<Duration>,
    mut shutdown: watch::Receiver<()>,
) -> Result<(), CamError> {
    let metadata = A::metadata();
    log::info!("Starting {} v{}", metadata.name, metadata.version);

    let result = match adapter.run().await {
        Ok(()) => serve(adapter, snapshot_interval, &mut shutdown).await,
        Err(e) => Err(e),
    };

    adapter.close().await;
    log::info!("Adapter stopped");
    result
}

async fn serve<A: CameraAdapter>(
    adapter: &A,
    snapshot_interval: Option<Duration>,
    shutdown: &mut watch::Receiver<()>,
) -> Result<(), CamError> {
    let Some(period) = snapshot_interval.filter(|p| !p.is_zero()) else {
        let _ = shutdown.changed().await;
        log::info!("Shutdown signal received");
        return Ok(());
    };

    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                log::info!("Shutdown signal received");
                return Ok(());
            }
            _ = ticker.tick() => {
                let path = adapter.get_snapshot().await?;
                log::debug!("Snapshot available at {}", path.display());
            }
        }
    }
}
