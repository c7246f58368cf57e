//! Adapter plugin surface
//!
//! The fleet manager drives every camera through the same capability set:
//! snapshots, stream URIs, motion signaling and a run/close lifecycle. This
//! module defines those traits and the helpers a standard `main()` needs.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rtsp_cam::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     setup_logging();
//!     let config = argh::from_env::<CamArgs>().into_config()?;
//!     let motion = Arc::new(MotionTracker::new());
//!     let cam = RtspCam::new(config, motion)?;
//!
//!     let (shutdown_tx, shutdown_rx) = watch::channel(());
//!     ctrlc::set_handler(move || {
//!         let _ = shutdown_tx.send(());
//!     })?;
//!
//!     run_adapter(&cam, None, shutdown_rx).await?;
//!     Ok(())
//! }
//! ```

mod runner;
mod traits;

pub use runner::{run_adapter, setup_logging, CamArgs};
pub use traits::{AdapterMetadata, CameraAdapter, MotionSignaler, SnapshotProvider, StreamSource};
