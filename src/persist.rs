//! Persistence collaborator contract
//!
//! The gateway reports liveness changes and tracking points to an external
//! store (the platform database). Every call is best-effort: failures are
//! logged by callers and never affect gateway state.

use anyhow::Result;
use async_trait::async_trait;
use skylink_shared::TelemetryFrame;

/// What the platform database knows about a drone
#[derive(Debug, Clone, PartialEq)]
pub struct DroneRecord {
    pub drone_id: String,
    pub is_active: bool,
}

/// External persistence collaborator for drone state
#[async_trait]
pub trait DroneRepository: Send + Sync {
    /// Look up a drone's stored record
    async fn get_drone(&self, drone_id: &str) -> Result<Option<DroneRecord>>;

    /// Mark a drone active or inactive
    async fn set_drone_active(&self, drone_id: &str, active: bool) -> Result<()>;

    /// Append a telemetry frame to the tracking history
    async fn record_tracking_point(&self, frame: &TelemetryFrame) -> Result<()>;
}

/// Repository that drops everything, for deployments without a database
/// and for tests that don't care about persistence.
#[derive(Debug, Default)]
pub struct NullRepository;

#[async_trait]
impl DroneRepository for NullRepository {
    async fn get_drone(&self, _drone_id: &str) -> Result<Option<DroneRecord>> {
        Ok(None)
    }

    async fn set_drone_active(&self, _drone_id: &str, _active: bool) -> Result<()> {
        Ok(())
    }

    async fn record_tracking_point(&self, _frame: &TelemetryFrame) -> Result<()> {
        Ok(())
    }
}
