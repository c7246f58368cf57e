//! Pull snapshots over HTTP.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::CamConfig;

/// Errors that can occur while pulling a snapshot. Logged, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reusable HTTP session for pulling still images from the camera.
#[derive(Clone)]
pub struct SnapshotFetcher {
    client: reqwest::Client,
    credentials: Option<(String, String)>,
}

impl SnapshotFetcher {
    /// Session without credentials
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials: None,
        }
    }

    /// Session sending Basic auth on every request
    pub fn with_basic_auth(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials: Some((username.into(), password.into())),
        }
    }

    /// Session built from the camera config, authenticated only when both
    /// username and password are set.
    pub fn from_config(config: &CamConfig) -> Self {
        match config.credentials() {
            Some((user, pass)) => Self::with_basic_auth(user, pass),
            None => {
                log::info!("No username or password provided for snapshot");
                Self::new()
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Pull `url` into `dest`.
    ///
    /// Failures are logged and leave the existing file untouched. Always
    /// returns `dest`, whether or not it was rewritten.
    pub async fn fetch(&self, url: &str, dest: &Path) -> PathBuf {
        log::info!("Fetching snapshot... {} {}", dest.display(), url);
        match self.try_fetch(url, dest).await {
            Ok(len) => log::debug!("Wrote {} byte snapshot to {}", len, dest.display()),
            Err(e) => log::error!("Failed to get snapshot from {}: {}", url, e),
        }
        dest.to_path_buf()
    }

    async fn try_fetch(&self, url: &str, dest: &Path) -> Result<usize, FetchError> {
        let mut request = self.client.get(url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let body = request.send().await?.error_for_status()?.bytes().await?;
        replace_file(dest, &body).await?;
        Ok(body.len())
    }
}

impl Default for SnapshotFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `contents` next to `dest` and rename it into place, so a failed
/// write never leaves a truncated image behind.
async fn replace_file(dest: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut partial = OsString::from(dest.as_os_str());
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = tokio::fs::write(&partial, contents).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    tokio::fs::rename(&partial, dest).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("screen.jpg");
        std::fs::write(&dest, b"old frame").unwrap();

        replace_file(&dest, b"new frame").await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new frame");
        assert!(!dir.path().join("screen.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_replace_file_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gone").join("screen.jpg");
        assert!(replace_file(&dest, b"frame").await.is_err());
    }

    #[test]
    fn test_from_config_credentials() {
        let mut config = CamConfig::with_source("rtsp://cam/1");
        config.snapshot_url = Some("http://cam/snap.jpg".to_string());
        assert!(!SnapshotFetcher::from_config(&config).is_authenticated());

        config.username = Some("admin".to_string());
        assert!(!SnapshotFetcher::from_config(&config).is_authenticated());

        config.password = Some("secret".to_string());
        assert!(SnapshotFetcher::from_config(&config).is_authenticated());
    }
}
