//! Single entry point for snapshots, hiding whether frames are sampled from
//! the stream or pulled from the camera's still-image URL.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;

use crate::capture::{CaptureError, CaptureSupervisor, SamplerStatus};
use crate::config::CamConfig;
use crate::fetch::SnapshotFetcher;

pub struct SnapshotSource {
    config: Arc<CamConfig>,
    frame_path: PathBuf,
    capture: Mutex<CaptureSupervisor>,
    session: OnceLock<SnapshotFetcher>,
}

impl SnapshotSource {
    pub fn new(config: Arc<CamConfig>, capture: CaptureSupervisor) -> Self {
        let frame_path = capture.frame_path().to_path_buf();
        Self {
            config,
            frame_path,
            capture: Mutex::new(capture),
            session: OnceLock::new(),
        }
    }

    pub fn frame_path(&self) -> &Path {
        &self.frame_path
    }

    /// Create the fetch session if a pull URL is configured.
    ///
    /// The session is built at most once; later calls return the same one.
    pub fn open_session(&self) -> Option<&SnapshotFetcher> {
        self.config.snapshot_url.as_ref()?;
        Some(
            self.session
                .get_or_init(|| SnapshotFetcher::from_config(&self.config)),
        )
    }

    /// Path of the latest snapshot.
    ///
    /// Only a sampler launch failure is reported; pull failures are logged and
    /// the previous image path is returned.
    pub async fn get_snapshot(&self) -> Result<PathBuf, CaptureError> {
        match (&self.config.snapshot_url, self.open_session()) {
            (Some(url), Some(session)) => Ok(session.fetch(url, &self.frame_path).await),
            _ => self.capture.lock().await.get_current_frame_path(),
        }
    }

    /// Current sampler status
    pub async fn sampler_status(&self) -> SamplerStatus {
        self.capture.lock().await.poll_status()
    }

    /// Number of samplers launched so far
    pub async fn sampler_spawn_count(&self) -> u32 {
        self.capture.lock().await.spawn_count()
    }

    /// Kill the sampler if one is running
    pub async fn shutdown_capture(&self) {
        self.capture.lock().await.shutdown();
    }
}
