//! Snapshot sampler supervision.
//!
//! A single external process (ffmpeg by default) reads the RTSP stream and
//! rewrites one JPEG per second at a fixed path. The supervisor only ever
//! polls the process for liveness; it never blocks waiting on it.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

use crate::config::RtspTransport;

/// Sampler status as last observed by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerStatus {
    /// No sampler has been launched yet
    Idle,
    /// Sampler is running
    Running { pid: u32 },
    /// Sampler has exited, with its exit code if it had one
    Exited(Option<i32>),
}

impl SamplerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SamplerStatus::Running { .. })
    }
}

/// Command line used to launch the sampler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerSpec {
    /// Executable path
    pub program: String,
    /// Command line arguments
    pub args: Vec<String>,
}

impl SamplerSpec {
    /// ffmpeg sampling `source` at 1 fps, overwriting `output` in place
    pub fn ffmpeg(
        ffmpeg_path: &str,
        source: &str,
        transport: RtspTransport,
        output: &Path,
    ) -> Self {
        let args = [
            "-nostdin",
            "-y",
            "-re",
            "-rtsp_transport",
            transport.as_str(),
            "-i",
            source,
            "-vf",
            "fps=1",
            "-update",
            "1",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(output.display().to_string()))
        .collect();

        Self {
            program: ffmpeg_path.to_string(),
            args,
        }
    }
}

/// Owns at most one live sampler process
pub struct CaptureSupervisor {
    spec: SamplerSpec,
    frame_path: PathBuf,
    status: SamplerStatus,
    spawn_count: u32,
    child: Option<Child>,
}

impl CaptureSupervisor {
    pub fn new(spec: SamplerSpec, frame_path: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            frame_path: frame_path.into(),
            status: SamplerStatus::Idle,
            spawn_count: 0,
            child: None,
        }
    }

    /// Path the sampler writes to
    pub fn frame_path(&self) -> &Path {
        &self.frame_path
    }

    /// Number of samplers launched over the supervisor's lifetime
    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    /// Path of the most recent frame, launching a sampler if none is alive.
    ///
    /// Returns as soon as the process is launched; the file may not exist yet
    /// (or may be mid-rewrite), callers must tolerate that.
    pub fn get_current_frame_path(&mut self) -> Result<PathBuf, CaptureError> {
        if !self.poll_status().is_running() {
            self.spawn()?;
        }
        Ok(self.frame_path.clone())
    }

    /// Refresh the status with a non-blocking liveness check
    pub fn poll_status(&mut self) -> SamplerStatus {
        if let Some(child) = &mut self.child {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let code = status.code();
                    log::info!("Snapshot sampler exited with code: {:?}", code);
                    self.status = SamplerStatus::Exited(code);
                    self.child = None;
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!("Error checking snapshot sampler status: {}", e);
                }
            }
        }

        self.status
    }

    fn spawn(&mut self) -> Result<(), CaptureError> {
        log::info!(
            "Spawning stream for snapshots: {} {}",
            self.spec.program,
            self.spec.args.join(" ")
        );

        let child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CaptureError::Spawn {
                program: self.spec.program.clone(),
                source,
            })?;

        let pid = child.id().unwrap_or(0);
        self.status = SamplerStatus::Running { pid };
        self.spawn_count += 1;
        self.child = Some(child);
        Ok(())
    }

    /// Kill the sampler if one is alive. No grace period, no wait.
    pub fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            log::info!("Stopping snapshot sampler");
            if let Err(e) = child.start_kill() {
                log::debug!("Snapshot sampler already gone: {}", e);
            }
            self.status = SamplerStatus::Exited(None);
        }
    }
}

/// Errors raised while launching the sampler
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to spawn sampler '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
