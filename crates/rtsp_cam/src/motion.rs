//! Motion state tracking.
//!
//! `MotionTracker` is the default `MotionSignaler`: it debounces repeated
//! start/stop triggers and publishes one event per transition to any number
//! of subscribers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::plugin::MotionSignaler;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Motion transition published by the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionEvent {
    Started { event_id: u64, at: DateTime<Utc> },
    Stopped { event_id: u64, at: DateTime<Utc> },
}

impl MotionEvent {
    pub fn event_id(&self) -> u64 {
        match self {
            MotionEvent::Started { event_id, .. } | MotionEvent::Stopped { event_id, .. } => {
                *event_id
            }
        }
    }
}

#[derive(Debug, Default)]
struct MotionState {
    active: bool,
    event_id: u64,
}

pub struct MotionTracker {
    state: Mutex<MotionState>,
    events: broadcast::Sender<MotionEvent>,
}

impl MotionTracker {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(MotionState::default()),
            events,
        }
    }

    /// Receive every transition published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<MotionEvent> {
        self.events.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// Id the next (or current) motion event carries
    pub fn event_id(&self) -> u64 {
        self.lock().event_id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MotionState> {
        // The state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, event: MotionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MotionSignaler for MotionTracker {
    async fn trigger_motion_start(&self) {
        let event = {
            let mut state = self.lock();
            if state.active {
                log::debug!("Motion event {} already in progress", state.event_id);
                return;
            }
            state.active = true;
            MotionEvent::Started {
                event_id: state.event_id,
                at: Utc::now(),
            }
        };

        log::info!("Motion event {} started", event.event_id());
        self.publish(event);
    }

    async fn trigger_motion_stop(&self) {
        let event = {
            let mut state = self.lock();
            if !state.active {
                log::debug!("No motion event in progress, ignoring stop");
                return;
            }
            state.active = false;
            let event = MotionEvent::Stopped {
                event_id: state.event_id,
                at: Utc::now(),
            };
            state.event_id += 1;
            event
        };

        log::info!("Motion event {} stopped", event.event_id());
        self.publish(event);
    }
}
