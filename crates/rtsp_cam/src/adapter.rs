//! RTSP camera adapter
//!
//! Serves snapshots of an RTSP source, either sampled by a supervised ffmpeg
//! process or pulled from a still-image URL, and optionally exposes the
//! motion control API.

use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::capture::{CaptureSupervisor, SamplerSpec, SamplerStatus};
use crate::config::CamConfig;
use crate::error::CamError;
use crate::http_api::ControlServer;
use crate::plugin::{
    AdapterMetadata, CameraAdapter, MotionSignaler, SnapshotProvider, StreamSource,
};
use crate::snapshot::SnapshotSource;

/// File name of the snapshot inside the scratch directory
pub const SNAPSHOT_FILE_NAME: &str = "screen.jpg";

pub struct RtspCam {
    config: Arc<CamConfig>,
    motion: Arc<dyn MotionSignaler>,
    snapshots: SnapshotSource,
    control: Mutex<Option<ControlServer>>,
    // Dropped last: removes the scratch directory
    scratch_dir: TempDir,
}

impl RtspCam {
    /// Create an adapter sampling snapshots with ffmpeg
    pub fn new(config: CamConfig, motion: Arc<dyn MotionSignaler>) -> Result<Self, CamError> {
        let ffmpeg_path = config.ffmpeg_path.clone();
        let source = config.source.clone();
        let transport = config.rtsp_transport;
        Self::with_sampler(config, motion, move |output| {
            SamplerSpec::ffmpeg(&ffmpeg_path, &source, transport, output)
        })
    }

    /// Create an adapter with a custom sampler command.
    ///
    /// `sampler` receives the snapshot path the command must keep rewriting.
    pub fn with_sampler<F>(
        config: CamConfig,
        motion: Arc<dyn MotionSignaler>,
        sampler: F,
    ) -> Result<Self, CamError>
    where
        F: FnOnce(&Path) -> SamplerSpec,
    {
        config.validate()?;

        let scratch_dir = tempfile::Builder::new().prefix("rtsp_cam").tempdir()?;
        let frame_path = scratch_dir.path().join(SNAPSHOT_FILE_NAME);
        let capture = CaptureSupervisor::new(sampler(&frame_path), frame_path);

        let config = Arc::new(config);
        Ok(Self {
            snapshots: SnapshotSource::new(config.clone(), capture),
            config,
            motion,
            control: Mutex::new(None),
            scratch_dir,
        })
    }

    pub fn config(&self) -> &CamConfig {
        &self.config
    }

    /// Private scratch directory holding the snapshot
    pub fn scratch_dir(&self) -> &Path {
        self.scratch_dir.path()
    }

    /// Fixed snapshot path, stable for the adapter's lifetime
    pub fn snapshot_path(&self) -> &Path {
        self.snapshots.frame_path()
    }

    /// Address of the control API while it is running
    pub async fn control_addr(&self) -> Option<SocketAddr> {
        self.control.lock().await.as_ref().map(|s| s.local_addr())
    }

    pub async fn sampler_status(&self) -> SamplerStatus {
        self.snapshots.sampler_status().await
    }

    pub async fn sampler_spawn_count(&self) -> u32 {
        self.snapshots.sampler_spawn_count().await
    }

    async fn start_control_server(&self, port: u16) -> Result<(), CamError> {
        let mut control = self.control.lock().await;
        if control.is_some() {
            log::debug!("HTTP API already running");
            return Ok(());
        }

        log::info!("Enabling HTTP API on port {}", port);
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let server = ControlServer::bind(addr, self.motion.clone())
            .await
            .map_err(|source| CamError::Bind { port, source })?;
        *control = Some(server);
        Ok(())
    }
}

#[async_trait]
impl SnapshotProvider for RtspCam {
    async fn get_snapshot(&self) -> Result<PathBuf, CamError> {
        Ok(self.snapshots.get_snapshot().await?)
    }
}

impl StreamSource for RtspCam {
    /// Every stream index maps to the single configured source
    fn get_stream_source(&self, _stream_index: &str) -> String {
        self.config.source.clone()
    }
}

#[async_trait]
impl CameraAdapter for RtspCam {
    fn metadata() -> AdapterMetadata {
        crate::adapter_metadata!()
    }

    async fn run(&self) -> Result<(), CamError> {
        self.snapshots.open_session();

        if let Some(port) = self.config.control_port() {
            self.start_control_server(port).await?;
        }
        Ok(())
    }

    async fn close(&self) {
        let server = self.control.lock().await.take();
        if let Some(server) = server {
            server.shutdown().await;
        }

        self.snapshots.shutdown_capture().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionTracker;

    fn motion() -> Arc<dyn MotionSignaler> {
        Arc::new(MotionTracker::new())
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = RtspCam::new(CamConfig::default(), motion());
        assert!(matches!(result, Err(CamError::Config(_))));
    }

    #[test]
    fn test_snapshot_path_in_scratch_dir() {
        let cam = RtspCam::new(CamConfig::with_source("rtsp://cam/1"), motion()).unwrap();
        assert!(cam.scratch_dir().is_dir());
        assert_eq!(
            cam.snapshot_path(),
            cam.scratch_dir().join(SNAPSHOT_FILE_NAME)
        );
    }

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let cam = RtspCam::new(CamConfig::with_source("rtsp://cam/1"), motion()).unwrap();
        let dir = cam.scratch_dir().to_path_buf();
        drop(cam);
        assert!(!dir.exists());
    }

    #[test]
    fn test_stream_source_ignores_index() {
        let cam = RtspCam::new(CamConfig::with_source("rtsp://cam/1"), motion()).unwrap();
        assert_eq!(cam.get_stream_source("video1"), "rtsp://cam/1");
        assert_eq!(cam.get_stream_source("video3"), "rtsp://cam/1");
    }

    #[test]
    fn test_metadata() {
        let metadata = RtspCam::metadata();
        assert_eq!(metadata.name, "rtsp_cam");
        assert!(!metadata.version.is_empty());
    }

    #[tokio::test]
    async fn test_close_without_run() {
        let cam = RtspCam::new(CamConfig::with_source("rtsp://cam/1"), motion()).unwrap();
        cam.close().await;
        cam.close().await;
        assert_eq!(cam.sampler_status().await, SamplerStatus::Idle);
        assert_eq!(cam.control_addr().await, None);
    }
}
