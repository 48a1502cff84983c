//! Mission store: the state machine over delivery missions
//!
//! Missions are created `pending`, move through the transition graph in
//! `skylink_shared::state_machine`, and are retained forever for listing.
//! Completing a mission with an operator assigned computes the operator's
//! earnings and emits it on the audit channel.

use crate::mission::earnings::compute_earnings;
use skylink_shared::{
    now_ms, state_machine, Mission, MissionPayload, MissionStatus,
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug, PartialEq)]
pub enum MissionError {
    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error("mission not found: {0}")]
    NotFound(Uuid),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: MissionStatus,
        to: MissionStatus,
    },
}

/// Payout computed when a mission completes; consumed by the audit log
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsEvent {
    pub mission_id: Uuid,
    pub operator_id: String,
    pub amount: f64,
}

/// Owns every mission for its entire lifecycle
pub struct MissionStore {
    missions: RwLock<HashMap<Uuid, Mission>>,
    earnings_tx: mpsc::UnboundedSender<EarningsEvent>,
    earnings_rx: RwLock<mpsc::UnboundedReceiver<EarningsEvent>>,
}

impl MissionStore {
    pub fn new() -> Self {
        let (earnings_tx, earnings_rx) = mpsc::unbounded_channel();
        Self {
            missions: RwLock::new(HashMap::new()),
            earnings_tx,
            earnings_rx: RwLock::new(earnings_rx),
        }
    }

    /// Create a mission in `pending` with a fresh unique id
    pub async fn create(&self, payload: MissionPayload) -> Result<Mission, MissionError> {
        if payload.pickup.trim().is_empty() {
            return Err(MissionError::Validation("pickup is required"));
        }
        if payload.dropoff.trim().is_empty() {
            return Err(MissionError::Validation("dropoff is required"));
        }

        let mission = Mission {
            id: Uuid::new_v4(),
            created_at: now_ms(),
            status: MissionStatus::Pending,
            client_name: payload.client_name,
            pickup: payload.pickup,
            dropoff: payload.dropoff,
            priority: payload.priority.unwrap_or_default(),
            package_details: payload.package_details,
            eta_minutes: payload.eta_minutes,
            operator_id: None,
        };

        let mut missions = self.missions.write().await;
        missions.insert(mission.id, mission.clone());
        info!("mission {} created ({} -> {})", mission.id, mission.pickup, mission.dropoff);
        Ok(mission)
    }

    pub async fn get(&self, mission_id: Uuid) -> Option<Mission> {
        let missions = self.missions.read().await;
        missions.get(&mission_id).cloned()
    }

    /// Set the operator and move the mission to `assigned`, atomically.
    ///
    /// Re-assigning an already assigned mission overwrites the operator; the
    /// platform has always allowed handoffs before takeoff. Missions in
    /// flight or in a terminal state cannot change hands.
    pub async fn assign(
        &self,
        mission_id: Uuid,
        operator_id: &str,
    ) -> Result<Mission, MissionError> {
        let mut missions = self.missions.write().await;
        let mission = missions
            .get_mut(&mission_id)
            .ok_or(MissionError::NotFound(mission_id))?;

        if !state_machine::is_valid_transition(mission.status, MissionStatus::Assigned) {
            return Err(MissionError::InvalidTransition {
                from: mission.status,
                to: MissionStatus::Assigned,
            });
        }

        mission.operator_id = Some(operator_id.to_string());
        mission.status = MissionStatus::Assigned;
        info!("mission {} assigned to {}", mission_id, operator_id);
        Ok(mission.clone())
    }

    /// Move the mission to a new status, enforcing the transition graph.
    ///
    /// Entering `completed` with an operator assigned computes earnings and
    /// emits the audit event; an emit failure is logged and the mission
    /// still completes.
    pub async fn update_status(
        &self,
        mission_id: Uuid,
        status: MissionStatus,
    ) -> Result<Mission, MissionError> {
        let updated = {
            let mut missions = self.missions.write().await;
            let mission = missions
                .get_mut(&mission_id)
                .ok_or(MissionError::NotFound(mission_id))?;

            if !state_machine::is_valid_transition(mission.status, status) {
                return Err(MissionError::InvalidTransition {
                    from: mission.status,
                    to: status,
                });
            }

            mission.status = status;
            mission.clone()
        };

        info!("mission {} is now {}", mission_id, status);

        if status == MissionStatus::Completed {
            if let Some(operator_id) = &updated.operator_id {
                let amount = compute_earnings(updated.package_details.as_deref());
                info!(
                    "mission {} earnings: ${:.2} for operator {}",
                    mission_id, amount, operator_id
                );

                let event = EarningsEvent {
                    mission_id,
                    operator_id: operator_id.clone(),
                    amount,
                };
                if self.earnings_tx.send(event).is_err() {
                    warn!("earnings audit channel closed, event for {} dropped", mission_id);
                }
            }
        }

        Ok(updated)
    }

    /// Every mission ever created, in no particular order
    pub async fn list_all(&self) -> Vec<Mission> {
        let missions = self.missions.read().await;
        missions.values().cloned().collect()
    }

    /// Missions still moving: pending, assigned, or in flight
    pub async fn list_active(&self) -> Vec<Mission> {
        let missions = self.missions.read().await;
        missions
            .values()
            .filter(|m| m.status.is_active())
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.missions.read().await.len()
    }

    /// Receive the next earnings audit event (blocks until one is emitted)
    pub async fn next_earnings(&self) -> Option<EarningsEvent> {
        self.earnings_rx.write().await.recv().await
    }
}

impl Default for MissionStore {
    fn default() -> Self {
        Self::new()
    }
}
