//! RTSP camera adapter
//!
//! Bridges an RTSP video source to the two capabilities a camera-fleet
//! manager needs from every camera:
//!
//! - on-demand snapshots, sampled at 1 fps by a supervised ffmpeg process or
//!   pulled from the camera's still-image URL
//! - motion start/stop triggers over a small HTTP API
//!
//! # Example Config
//!
//! ```yaml
//! source: "rtsp://192.168.1.10:554/stream"
//! rtsp_transport: tcp
//! snapshot_url: "http://192.168.1.10/snap.jpg"
//! username: admin
//! password: secret
//! http_api: 8080
//! ```

pub mod adapter;
pub mod capture;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http_api;
pub mod motion;
pub mod plugin;
pub mod snapshot;

pub use adapter::{RtspCam, SNAPSHOT_FILE_NAME};
pub use capture::{CaptureError, CaptureSupervisor, SamplerSpec, SamplerStatus};
pub use config::{CamConfig, ConfigError, RtspTransport};
pub use error::CamError;
pub use fetch::SnapshotFetcher;
pub use http_api::{create_router, ControlServer};
pub use motion::{MotionEvent, MotionTracker};

/// Commonly used items for adapter binaries
pub mod prelude {
    pub use crate::plugin::{
        run_adapter, setup_logging, AdapterMetadata, CamArgs, CameraAdapter, MotionSignaler,
        SnapshotProvider, StreamSource,
    };
    pub use crate::{CamConfig, CamError, MotionEvent, MotionTracker, RtspCam};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
    pub use tokio::sync::watch;
}
