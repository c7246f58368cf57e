//! Error types for the RTSP camera adapter.

use thiserror::Error;

use crate::capture::CaptureError;
use crate::config::ConfigError;

/// Errors that can abort adapter startup or a snapshot request.
///
/// Recoverable failures (a snapshot pull that times out, a teardown step on an
/// already-dead process) never surface here; they are logged where they occur.
#[derive(Debug, Error)]
pub enum CamError {
    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The snapshot sampler could not be launched
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// The motion control server could not bind its port
    #[error("Failed to bind control API on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
