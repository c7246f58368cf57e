//! Test helpers for adapter integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Router,
};
use rtsp_cam::plugin::MotionSignaler;
use rtsp_cam::SamplerSpec;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const IMAGE_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg\xff\xd9";

/// Authorization headers seen by the image server, one entry per request
pub type SeenAuth = Arc<Mutex<Vec<Option<String>>>>;

/// Handle to a local image server for pull-snapshot tests
pub struct ImageServer {
    pub addr: SocketAddr,
    pub seen_auth: SeenAuth,
    task: tokio::task::JoinHandle<()>,
}

impl ImageServer {
    /// Serve `/snap.jpg` (always 200) and `/denied.jpg` (always 401)
    pub async fn start() -> Self {
        let seen_auth: SeenAuth = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route("/snap.jpg", get(snap))
            .route("/denied.jpg", get(denied))
            .with_state(seen_auth.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            seen_auth,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<Option<String>> {
        self.seen_auth.lock().unwrap().clone()
    }
}

impl Drop for ImageServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn record(seen: &SeenAuth, headers: &HeaderMap) {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    seen.lock().unwrap().push(auth);
}

async fn snap(State(seen): State<SeenAuth>, headers: HeaderMap) -> &'static [u8] {
    record(&seen, &headers);
    IMAGE_BYTES
}

async fn denied(State(seen): State<SeenAuth>, headers: HeaderMap) -> StatusCode {
    record(&seen, &headers);
    StatusCode::UNAUTHORIZED
}

/// Address with nothing listening on it
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Sampler that stays alive and ignores the snapshot path
pub fn sleeping_sampler(_output: &std::path::Path) -> SamplerSpec {
    SamplerSpec {
        program: "sleep".to_string(),
        args: vec!["30".to_string()],
    }
}

/// Sampler that exits immediately
pub fn exiting_sampler(_output: &std::path::Path) -> SamplerSpec {
    SamplerSpec {
        program: "true".to_string(),
        args: vec![],
    }
}

/// Motion signaler counting invocations
#[derive(Default)]
pub struct CountingSignaler {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl CountingSignaler {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
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
