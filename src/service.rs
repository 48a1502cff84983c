//! Boundary-facing facade over the core
//!
//! `CoreService` bundles the gateway components and the mission store into
//! the exact operation set the HTTP/CLI boundary consumes. Everything here
//! delegates; no behavior of its own.

use crate::config::GatewayConfig;
use crate::gateway::{
    CommandDispatcher, DispatchError, EndpointRegistry, IngestLoop, StaleReaper, TelemetryCache,
    TelemetryFanout, TelemetrySubscription,
};
use crate::mission::{MissionError, MissionStore};
use crate::persist::DroneRepository;
use skylink_shared::{CommandEnvelope, Mission, MissionPayload, MissionStatus, TelemetryFrame};
use std::sync::Arc;
use tokio::net::UdpSocket;
use uuid::Uuid;

/// The core's public surface: drone gateway plus mission lifecycle
pub struct CoreService {
    registry: Arc<EndpointRegistry>,
    cache: Arc<TelemetryCache>,
    fanout: Arc<TelemetryFanout>,
    dispatcher: CommandDispatcher,
    missions: Arc<MissionStore>,
    ingest: Arc<IngestLoop>,
    reaper: Arc<StaleReaper>,
}

impl CoreService {
    /// Wire every component onto a bound gateway socket
    pub fn new(
        socket: Arc<UdpSocket>,
        config: &GatewayConfig,
        repo: Arc<dyn DroneRepository>,
    ) -> Self {
        let registry = Arc::new(EndpointRegistry::new());
        let cache = Arc::new(TelemetryCache::new());
        let fanout = Arc::new(TelemetryFanout::new(config.fanout_buffer));

        let ingest = Arc::new(IngestLoop::new(
            socket.clone(),
            registry.clone(),
            cache.clone(),
            fanout.clone(),
            repo.clone(),
        ));
        let reaper = Arc::new(StaleReaper::new(registry.clone(), repo, config));
        let dispatcher = CommandDispatcher::new(socket, registry.clone());

        Self {
            registry,
            cache,
            fanout,
            dispatcher,
            missions: Arc::new(MissionStore::new()),
            ingest,
            reaper,
        }
    }

    /// The ingestion loop, for the binary to run in the foreground
    pub fn ingest(&self) -> Arc<IngestLoop> {
        self.ingest.clone()
    }

    /// The reaper, for the binary to spawn on its own timer
    pub fn reaper(&self) -> Arc<StaleReaper> {
        self.reaper.clone()
    }

    pub fn missions(&self) -> Arc<MissionStore> {
        self.missions.clone()
    }

    // Mission operations

    pub async fn create_mission(&self, payload: MissionPayload) -> Result<Mission, MissionError> {
        self.missions.create(payload).await
    }

    pub async fn assign_mission(
        &self,
        mission_id: Uuid,
        operator_id: &str,
    ) -> Result<Mission, MissionError> {
        self.missions.assign(mission_id, operator_id).await
    }

    pub async fn update_mission_status(
        &self,
        mission_id: Uuid,
        status: MissionStatus,
    ) -> Result<Mission, MissionError> {
        self.missions.update_status(mission_id, status).await
    }

    pub async fn list_missions(&self) -> Vec<Mission> {
        self.missions.list_all().await
    }

    pub async fn active_missions(&self) -> Vec<Mission> {
        self.missions.list_active().await
    }

    // Telemetry operations

    pub async fn latest_telemetry(&self) -> Vec<TelemetryFrame> {
        self.cache.latest().await
    }

    pub async fn subscribe_telemetry(&self) -> TelemetrySubscription {
        self.fanout.subscribe().await
    }

    pub async fn unsubscribe_telemetry(&self, id: u64) {
        self.fanout.unsubscribe(id).await
    }

    /// Seed a frame without a datagram; used by tests and the boundary's
    /// mock-telemetry endpoint
    pub async fn push_frame(&self, frame: TelemetryFrame) {
        self.cache.insert(frame.clone()).await;
        self.fanout.publish(&frame).await;
    }

    // Drone operations

    pub async fn send_command(&self, command: &CommandEnvelope) -> Result<(), DispatchError> {
        self.dispatcher.send(command).await
    }

    pub async fn connected_drones(&self) -> Vec<String> {
        self.registry.list().await
    }
}
