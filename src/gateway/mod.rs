//! Drone-facing UDP gateway
//!
//! This module handles:
//! - Classifying and ingesting handshake/heartbeat/telemetry datagrams
//! - Tracking where each drone is currently reachable
//! - Caching the latest telemetry frame per drone
//! - Fanning out live frames to subscribers without blocking ingestion
//! - Dispatching operator commands back over the same socket
//! - Reaping endpoints that go silent

mod dispatcher;
mod ingest;
mod reaper;
mod registry;
mod telemetry;

pub use dispatcher::{CommandDispatcher, DispatchError};
pub use ingest::IngestLoop;
pub use reaper::StaleReaper;
pub use registry::{Endpoint, EndpointRegistry};
pub use telemetry::{TelemetryCache, TelemetryFanout, TelemetrySubscription};
