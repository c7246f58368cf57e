use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// RTSP lower transport handed to the sampler (`-rtsp_transport`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RtspTransport {
    /// Interleaved over the RTSP TCP connection
    #[default]
    Tcp,
    /// Plain RTP over UDP
    Udp,
    /// RTP over UDP multicast
    UdpMulticast,
    /// Tunnelled over HTTP
    Http,
}

impl RtspTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            RtspTransport::Tcp => "tcp",
            RtspTransport::Udp => "udp",
            RtspTransport::UdpMulticast => "udp_multicast",
            RtspTransport::Http => "http",
        }
    }
}

impl fmt::Display for RtspTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RtspTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(RtspTransport::Tcp),
            "udp" => Ok(RtspTransport::Udp),
            "udp_multicast" | "udp-multicast" => Ok(RtspTransport::UdpMulticast),
            "http" => Ok(RtspTransport::Http),
            other => Err(format!(
                "unknown rtsp transport '{}'; expected tcp, udp, udp_multicast or http",
                other
            )),
        }
    }
}

/// Source descriptor for a single RTSP camera.
///
/// Read once at adapter construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CamConfig {
    /// Stream source (e.g., rtsp://192.168.1.10:554/stream)
    pub source: String,
    /// Transport used by the sampler when reading the source
    pub rtsp_transport: RtspTransport,
    /// Camera username for pull snapshots
    pub username: Option<String>,
    /// Camera password for pull snapshots
    pub password: Option<String>,
    /// HTTP URL of a still image; when set, snapshots are pulled instead of sampled
    pub snapshot_url: Option<String>,
    /// Port of the motion control API, 0 disables it
    pub http_api: u16,
    /// Sampler executable
    pub ffmpeg_path: String,
    /// Seconds between snapshot polls in the standalone binary, 0 disables polling
    pub snapshot_interval: u64,
}

impl Default for CamConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            rtsp_transport: RtspTransport::default(),
            username: None,
            password: None,
            snapshot_url: None,
            http_api: 0,
            ffmpeg_path: default_ffmpeg_path(),
            snapshot_interval: 0,
        }
    }
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl CamConfig {
    /// Config with the given source and every other field defaulted
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Check the fields that cannot be expressed through serde defaults
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "stream source is required".to_string(),
            ));
        }

        if let Some(url) = &self.snapshot_url {
            let parsed = reqwest::Url::parse(url).map_err(|e| {
                ConfigError::ValidationError(format!("invalid snapshot_url '{}': {}", url, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::ValidationError(format!(
                    "snapshot_url must be http(s), got '{}'",
                    parsed.scheme()
                )));
            }
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ffmpeg_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Control API port, or `None` when disabled
    pub fn control_port(&self) -> Option<u16> {
        (self.http_api > 0).then_some(self.http_api)
    }

    /// Basic auth pair for pull snapshots.
    ///
    /// Only returned when both halves are configured; a username on its own
    /// yields an unauthenticated session, matching existing deployments.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
