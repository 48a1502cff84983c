//! SkyLink Shared Protocol Types
//!
//! This crate provides the shared protocol types and codec for communication
//! between drone bridges, the UDP gateway, and the mission API boundary.

pub mod codec;
pub mod state_machine;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Liveness parameters for the gateway
pub mod liveness {
    /// Endpoint is considered stale after this much silence
    pub const STALE_TIMEOUT_MS: u64 = 30_000;

    /// Period between reaper sweeps
    pub const REAP_INTERVAL_MS: u64 = 30_000;

    /// Per-subscriber fan-out buffer, in frames
    pub const FANOUT_BUFFER_FRAMES: usize = 64;

    /// Default UDP port the gateway listens on
    pub const DEFAULT_GATEWAY_PORT: u16 = 5761;
}

/// A point-in-time snapshot of a drone's reported position, battery, and
/// status. Superseded in the telemetry cache on each new datagram; never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryFrame {
    pub drone_id: String,
    /// Battery percent, 0-100
    pub battery: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above ground
    pub altitude: f64,
    /// Meters per second
    pub speed: f64,
    /// Degrees, 0-360
    pub heading: f64,
    /// Link quality percent, 0-100
    pub signal_quality: f64,
    /// Free-form status tag reported by the drone, often mirroring the
    /// mission status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Milliseconds since Unix epoch, stamped by the gateway on ingest
    pub updated_at: u64,
}

/// Operator command addressed to a single drone. Transient: built per
/// dispatch call, sent as one UDP datagram, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    pub drone_id: String,
    #[serde(rename = "type")]
    pub kind: CommandKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl CommandEnvelope {
    /// Create a command with no payload
    pub fn new(drone_id: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            drone_id: drone_id.into(),
            kind,
            payload: None,
        }
    }

    /// Create a command carrying a free-form payload
    pub fn with_payload(
        drone_id: impl Into<String>,
        kind: CommandKind,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            drone_id: drone_id.into(),
            kind,
            payload: Some(payload),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Waypoint,
    ReturnToBase,
    Pause,
    Resume,
    Land,
    Custom,
}

/// Mission lifecycle status.
///
/// Canonical states only; the legacy `"confirmed"` wire value is accepted on
/// parse as an alias for `Assigned` and never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionStatus {
    Pending,
    #[serde(alias = "confirmed")]
    Assigned,
    InFlight,
    Completed,
    Failed,
}

impl MissionStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Failed)
    }

    /// Active missions show up in the live dispatch views
    pub fn is_active(self) -> bool {
        matches!(
            self,
            MissionStatus::Pending | MissionStatus::Assigned | MissionStatus::InFlight
        )
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MissionStatus::Pending => "pending",
            MissionStatus::Assigned => "assigned",
            MissionStatus::InFlight => "in-flight",
            MissionStatus::Completed => "completed",
            MissionStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for MissionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MissionStatus::Pending),
            "assigned" | "confirmed" => Ok(MissionStatus::Assigned),
            "in-flight" => Ok(MissionStatus::InFlight),
            "completed" => Ok(MissionStatus::Completed),
            "failed" => Ok(MissionStatus::Failed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mission status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionPriority {
    #[default]
    Standard,
    Express,
    Critical,
}

/// Fields a caller submits to open a delivery mission. Pickup and dropoff
/// are validated non-empty by the store; everything else is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default)]
    pub pickup: String,
    #[serde(default)]
    pub dropoff: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<MissionPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
}

/// A delivery mission tracked from creation to a terminal state. Owned by
/// the mission store for its entire lifecycle; mutated only through defined
/// transitions, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: Uuid,
    /// Milliseconds since Unix epoch
    pub created_at: u64,
    pub status: MissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    pub pickup: String,
    pub dropoff: String,
    pub priority: MissionPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
}
