//! Stale-connection reaper
//!
//! Periodic sweep that evicts endpoints whose last-seen age exceeds the
//! staleness threshold and reports the drone inactive to the platform
//! store. The report is a courtesy signal: failures are logged and never
//! roll back the eviction.

use crate::config::GatewayConfig;
use crate::gateway::registry::EndpointRegistry;
use crate::persist::DroneRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

/// Evicts endpoints that have gone silent
pub struct StaleReaper {
    registry: Arc<EndpointRegistry>,
    repo: Arc<dyn DroneRepository>,
    sweep_interval: Duration,
    max_age: Duration,
}

impl StaleReaper {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        repo: Arc<dyn DroneRepository>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            registry,
            repo,
            sweep_interval: config.reap_interval,
            max_age: config.stale_timeout,
        }
    }

    /// Run sweeps forever on the configured period
    pub async fn run(&self) {
        let mut ticker = interval(self.sweep_interval);
        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }

    /// One sweep: evict every stale endpoint and report each drone
    /// inactive. Returns the evicted ids.
    pub async fn sweep(&self) -> Vec<String> {
        let evicted = self.registry.evict_stale(self.max_age).await;

        for drone_id in &evicted {
            info!("drone {} went silent, endpoint evicted", drone_id);

            let repo = self.repo.clone();
            let drone_id = drone_id.clone();
            tokio::spawn(async move {
                if let Err(e) = repo.set_drone_active(&drone_id, false).await {
                    warn!("failed to mark {} inactive: {:#}", drone_id, e);
                }
            });
        }

        evicted
    }
}
