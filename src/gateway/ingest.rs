//! UDP ingestion loop
//!
//! Single consumer of the gateway socket. Each datagram is classified and
//! applied to the endpoint registry, telemetry cache, and fan-out. Malformed
//! input is logged and dropped; nothing arriving on this socket can take the
//! loop down.

use crate::gateway::registry::EndpointRegistry;
use crate::gateway::telemetry::{TelemetryCache, TelemetryFanout};
use crate::persist::DroneRepository;
use skylink_shared::codec::{self, Datagram};
use skylink_shared::TelemetryFrame;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

const RECV_BUFFER_BYTES: usize = 4096;

/// Receives datagrams and applies them to the shared gateway state
pub struct IngestLoop {
    socket: Arc<UdpSocket>,
    registry: Arc<EndpointRegistry>,
    cache: Arc<TelemetryCache>,
    fanout: Arc<TelemetryFanout>,
    repo: Arc<dyn DroneRepository>,
}

impl IngestLoop {
    pub fn new(
        socket: Arc<UdpSocket>,
        registry: Arc<EndpointRegistry>,
        cache: Arc<TelemetryCache>,
        fanout: Arc<TelemetryFanout>,
        repo: Arc<dyn DroneRepository>,
    ) -> Self {
        Self {
            socket,
            registry,
            cache,
            fanout,
            repo,
        }
    }

    /// Run the receive loop until the socket fails
    pub async fn run(&self) -> anyhow::Result<()> {
        let local = self.socket.local_addr()?;
        info!("gateway listening for drone UDP on {}", local);

        let mut buf = vec![0u8; RECV_BUFFER_BYTES];
        loop {
            let (len, src) = self.socket.recv_from(&mut buf).await?;
            self.handle_datagram(&buf[..len], src).await;
        }
    }

    /// Classify one datagram and update shared state. Never fails: this is
    /// a public, untrusted transport boundary.
    pub async fn handle_datagram(&self, payload: &[u8], src: SocketAddr) {
        match codec::classify(payload) {
            Ok(Datagram::Handshake { drone_id }) => self.handle_handshake(&drone_id, src).await,
            Ok(Datagram::Heartbeat { drone_id }) => {
                if !self.registry.touch(&drone_id).await {
                    // Heartbeats refresh existing endpoints only; a drone
                    // that skipped handshake registers via telemetry instead.
                    debug!("heartbeat from unregistered drone {}, ignored", drone_id);
                }
            }
            Ok(Datagram::Telemetry(frame)) => self.handle_telemetry(frame, src).await,
            Err(e) => debug!("dropped datagram from {}: {}", src, e),
        }
    }

    async fn handle_handshake(&self, drone_id: &str, src: SocketAddr) {
        self.registry.register(drone_id, src).await;
        info!("drone {} connected from {}", drone_id, src);
        self.report_active(drone_id, true);
    }

    async fn handle_telemetry(&self, frame: TelemetryFrame, src: SocketAddr) {
        // Self-healing path: a drone that never handshook is registered off
        // its first telemetry packet's source address.
        if self.registry.register(&frame.drone_id, src).await {
            info!("drone {} registered via telemetry from {}", frame.drone_id, src);
            self.report_active(&frame.drone_id, true);
        }

        self.cache.insert(frame.clone()).await;
        self.fanout.publish(&frame).await;

        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.record_tracking_point(&frame).await {
                warn!("failed to record tracking point for {}: {:#}", frame.drone_id, e);
            }
        });
    }

    /// Report liveness to the platform store off the hot path; persistence
    /// is best-effort and must not slow the socket loop.
    fn report_active(&self, drone_id: &str, active: bool) {
        let repo = self.repo.clone();
        let drone_id = drone_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = repo.set_drone_active(&drone_id, active).await {
                warn!("failed to mark {} active={}: {:#}", drone_id, active, e);
            }
        });
    }
}
