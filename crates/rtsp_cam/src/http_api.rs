//! HTTP motion control API
//!
//! Lets an external integration (e.g. a motion-detection service) trigger
//! motion start/stop on the adapter with plain GET requests.

use axum::{extract::State, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::plugin::MotionSignaler;

/// How long a stopping server may take to drain before its task is aborted
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub motion: Arc<dyn MotionSignaler>,
}

/// GET /start_motion - Signal motion start
async fn start_motion(State(state): State<AppState>) -> &'static str {
    log::debug!("Starting motion");
    state.motion.trigger_motion_start().await;
    "ok"
}

/// GET /stop_motion - Signal motion stop
async fn stop_motion(State(state): State<AppState>) -> &'static str {
    log::debug!("Stopping motion");
    state.motion.trigger_motion_stop().await;
    "ok"
}

/// Create the HTTP router
pub fn create_router(motion: Arc<dyn MotionSignaler>) -> Router {
    let state = AppState { motion };

    Router::new()
        .route("/start_motion", get(start_motion))
        .route("/stop_motion", get(stop_motion))
        .with_state(state)
}

/// A running control API server
pub struct ControlServer {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl ControlServer {
    /// Bind `addr` and start serving in a background task.
    ///
    /// Bind errors are returned; errors while serving are logged.
    pub async fn bind(
        addr: SocketAddr,
        motion: Arc<dyn MotionSignaler>,
    ) -> Result<Self, std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let app = create_router(motion);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await;
            if let Err(e) = result {
                log::error!("Control API server error: {}", e);
            }
        });

        log::info!("HTTP API listening on {}", local_addr);
        Ok(Self {
            local_addr,
            shutdown_tx,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting requests and release the port
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());

        let mut task = self.task;
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            log::warn!("Control API did not drain in time, aborting");
            task.abort();
            let _ = task.await;
        }
        log::info!("HTTP API on {} stopped", self.local_addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSignaler {
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    #[async_trait]
    impl MotionSignaler for CountingSignaler {
        async fn trigger_motion_start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        async fn trigger_motion_stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
        let resp = reqwest::get(format!("http://{}{}", addr, path))
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.text().await.unwrap())
    }

    #[tokio::test]
    async fn test_start_and_stop_routes() {
        let signaler = Arc::new(CountingSignaler::default());
        let server = ControlServer::bind("127.0.0.1:0".parse().unwrap(), signaler.clone())
            .await
            .unwrap();
        let addr = server.local_addr();

        assert_eq!(get(addr, "/start_motion").await, (200, "ok".to_string()));
        assert_eq!(signaler.starts.load(Ordering::SeqCst), 1);
        assert_eq!(signaler.stops.load(Ordering::SeqCst), 0);

        assert_eq!(get(addr, "/stop_motion").await, (200, "ok".to_string()));
        assert_eq!(signaler.starts.load(Ordering::SeqCst), 1);
        assert_eq!(signaler.stops.load(Ordering::SeqCst), 1);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let signaler = Arc::new(CountingSignaler::default());
        let server = ControlServer::bind("127.0.0.1:0".parse().unwrap(), signaler.clone())
            .await
            .unwrap();

        let (status, _) = get(server.local_addr(), "/motion").await;
        assert_eq!(status, 404);
        assert_eq!(signaler.starts.load(Ordering::SeqCst), 0);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_releases_port() {
        let signaler = Arc::new(CountingSignaler::default());
        let server = ControlServer::bind("127.0.0.1:0".parse().unwrap(), signaler.clone())
            .await
            .unwrap();
        let addr = server.local_addr();
        server.shutdown().await;

        let rebound = ControlServer::bind(addr, signaler).await.unwrap();
        rebound.shutdown().await;
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let signaler = Arc::new(CountingSignaler::default());
        let server = ControlServer::bind("127.0.0.1:0".parse().unwrap(), signaler.clone())
            .await
            .unwrap();

        let result = ControlServer::bind(server.local_addr(), signaler).await;
        assert!(result.is_err());

        server.shutdown().await;
    }
}
