//! RTSP camera adapter
//!
//! Runs a single RTSP camera adapter until Ctrl+C, logging motion events and
//! optionally polling snapshots.

use rtsp_cam::prelude::*;
use std::time::Duration;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();

    let args: CamArgs = argh::from_env();
    let config = args.into_config()?;
    let snapshot_interval =
        (config.snapshot_interval > 0).then(|| Duration::from_secs(config.snapshot_interval));

    log::info!("Stream source: {}", config.source);
    match &config.snapshot_url {
        Some(url) => log::info!("Snapshots pulled from: {}", url),
        None => log::info!("Snapshots sampled with {}", config.ffmpeg_path),
    }

    let motion = Arc::new(MotionTracker::new());
    let mut events = motion.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(MotionEvent::Started { event_id, at }) => {
                    log::info!("Motion {} started at {}", event_id, at.to_rfc3339())
                }
                Ok(MotionEvent::Stopped { event_id, at }) => {
                    log::info!("Motion {} stopped at {}", event_id, at.to_rfc3339())
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("Missed {} motion events", missed)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let cam = RtspCam::new(config, motion)?;

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    })?;

    log::info!("Adapter running. Press Ctrl+C to stop.");
    run_adapter(&cam, snapshot_interval, shutdown_rx).await?;

    Ok(())
}
