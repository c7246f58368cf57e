//! Capability traits a camera adapter exposes to the fleet manager.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::CamError;

/// Static information about an adapter implementation.
#[derive(Debug, Clone)]
pub struct AdapterMetadata {
    /// Short name identifier from CARGO_PKG_NAME
    pub name: &'static str,
    /// SemVer version string from CARGO_PKG_VERSION
    pub version: &'static str,
    /// Human-readable description from CARGO_PKG_DESCRIPTION
    pub description: &'static str,
}

/// Macro to generate AdapterMetadata from the Cargo.toml manifest.
#[macro_export]
macro_rules! adapter_metadata {
    () => {
        $crate::plugin::AdapterMetadata {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
        }
    };
}

/// Produces still images of the camera view.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Return a local path holding the latest snapshot.
    ///
    /// The path is best effort: recoverable failures are logged and the
    /// previous image is returned. An error means the adapter cannot produce
    /// snapshots at all.
    async fn get_snapshot(&self) -> Result<PathBuf, CamError>;
}

/// Motion signaling provided by the generic adapter layer.
///
/// Implementations own any debouncing or state tracking; callers fire and
/// forget.
#[async_trait]
pub trait MotionSignaler: Send + Sync {
    async fn trigger_motion_start(&self);

    async fn trigger_motion_stop(&self);
}

/// Resolves stream URIs for the fleet manager.
pub trait StreamSource {
    /// Stream URI for the given stream index (e.g. "video1")
    fn get_stream_source(&self, stream_index: &str) -> String;
}

/// The trait a camera adapter implements to be driven by the fleet manager.
///
/// Lifecycle:
/// 1. construct the adapter
/// 2. `run()` - open sessions and servers
/// 3. serve `get_snapshot()` / `get_stream_source()` calls
/// 4. `close()` - release everything, safe to call any number of times
#[async_trait]
pub trait CameraAdapter: SnapshotProvider + StreamSource + Send + Sync {
    /// Return metadata about this adapter.
    fn metadata() -> AdapterMetadata
    where
        Self: Sized;

    /// Start the adapter's network surfaces.
    async fn run(&self) -> Result<(), CamError>;

    /// Release every resource the adapter holds. Never fails.
    async fn close(&self);
}
