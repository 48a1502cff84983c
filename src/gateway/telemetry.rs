//! Telemetry cache and subscriber fan-out

use skylink_shared::TelemetryFrame;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, trace};

/// Latest known frame per drone. Last writer wins; frames are replaced
/// whole, never patched.
pub struct TelemetryCache {
    frames: RwLock<HashMap<String, TelemetryFrame>>,
}

impl TelemetryCache {
    pub fn new() -> Self {
        Self {
            frames: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, frame: TelemetryFrame) {
        let mut frames = self.frames.write().await;
        frames.insert(frame.drone_id.clone(), frame);
    }

    pub async fn get(&self, drone_id: &str) -> Option<TelemetryFrame> {
        let frames = self.frames.read().await;
        frames.get(drone_id).cloned()
    }

    /// One frame per known drone, in no particular order
    pub async fn latest(&self) -> Vec<TelemetryFrame> {
        let frames = self.frames.read().await;
        frames.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.frames.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.frames.read().await.is_empty()
    }
}

impl Default for TelemetryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a live telemetry stream. Dropping it (or the consuming side
/// disconnecting) lets the fan-out prune the subscriber on the next publish.
pub struct TelemetrySubscription {
    id: u64,
    rx: mpsc::Receiver<TelemetryFrame>,
}

impl TelemetrySubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Receive the next frame, or None once unsubscribed
    pub async fn recv(&mut self) -> Option<TelemetryFrame> {
        self.rx.recv().await
    }

    /// Non-blocking receive for drain-style consumers
    pub fn try_recv(&mut self) -> Option<TelemetryFrame> {
        self.rx.try_recv().ok()
    }
}

/// Broadcasts each newly cached frame to all live subscribers.
///
/// Every subscriber gets its own bounded channel and publishing uses
/// `try_send`: a full buffer drops the frame for that subscriber instead of
/// stalling the ingestion loop.
pub struct TelemetryFanout {
    subscribers: RwLock<HashMap<u64, mpsc::Sender<TelemetryFrame>>>,
    next_id: AtomicU64,
    buffer: usize,
}

impl TelemetryFanout {
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            buffer: buffer.max(1),
        }
    }

    /// Attach a new subscriber
    pub async fn subscribe(&self) -> TelemetrySubscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::channel(self.buffer);

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, tx);
        debug!("telemetry subscriber {} attached", id);

        TelemetrySubscription { id, rx }
    }

    /// Detach a subscriber by handle id
    pub async fn unsubscribe(&self, id: u64) {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.remove(&id).is_some() {
            debug!("telemetry subscriber {} detached", id);
        }
    }

    /// Deliver a frame to every live subscriber without blocking
    pub async fn publish(&self, frame: &TelemetryFrame) {
        let mut closed = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, tx) in subscribers.iter() {
                match tx.try_send(frame.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        trace!("subscriber {} buffer full, frame dropped", id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        closed.push(*id);
                    }
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in closed {
                subscribers.remove(&id);
                debug!("telemetry subscriber {} disconnected, pruned", id);
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}
