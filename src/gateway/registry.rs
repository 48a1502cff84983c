//! Endpoint registry tracking where each drone is currently reachable

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// The network address a drone is reachable at, with liveness timestamps
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub drone_id: String,
    pub addr: SocketAddr,
    pub last_seen: Instant,
    pub connected_at: Instant,
}

impl Endpoint {
    fn new(drone_id: String, addr: SocketAddr) -> Self {
        let now = Instant::now();
        Self {
            drone_id,
            addr,
            last_seen: now,
            connected_at: now,
        }
    }
}

/// Maps drone id to its current endpoint. Writes come from the ingestion
/// loop (register/touch) and the reaper (evict); everything else reads.
pub struct EndpointRegistry {
    endpoints: RwLock<HashMap<String, Endpoint>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
        }
    }

    /// Create or update an endpoint and refresh its last-seen time.
    /// Returns true if the drone was not registered before.
    pub async fn register(&self, drone_id: &str, addr: SocketAddr) -> bool {
        let mut endpoints = self.endpoints.write().await;
        match endpoints.get_mut(drone_id) {
            Some(endpoint) => {
                endpoint.addr = addr;
                endpoint.last_seen = Instant::now();
                false
            }
            None => {
                endpoints.insert(drone_id.to_string(), Endpoint::new(drone_id.to_string(), addr));
                true
            }
        }
    }

    /// Refresh last-seen only. Returns false if the drone has no endpoint;
    /// heartbeats never create one.
    pub async fn touch(&self, drone_id: &str) -> bool {
        let mut endpoints = self.endpoints.write().await;
        match endpoints.get_mut(drone_id) {
            Some(endpoint) => {
                endpoint.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Look up the address a drone is currently reachable at
    pub async fn resolve(&self, drone_id: &str) -> Option<SocketAddr> {
        let endpoints = self.endpoints.read().await;
        endpoints.get(drone_id).map(|e| e.addr)
    }

    /// Get the full endpoint entry for a drone
    pub async fn get(&self, drone_id: &str) -> Option<Endpoint> {
        let endpoints = self.endpoints.read().await;
        endpoints.get(drone_id).cloned()
    }

    /// Remove a drone's endpoint. Returns true if one existed.
    pub async fn evict(&self, drone_id: &str) -> bool {
        let mut endpoints = self.endpoints.write().await;
        endpoints.remove(drone_id).is_some()
    }

    /// Ids of all currently registered drones
    pub async fn list(&self) -> Vec<String> {
        let endpoints = self.endpoints.read().await;
        endpoints.keys().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.endpoints.read().await.len()
    }

    /// Ids of endpoints that have been silent longer than `max_age`
    pub async fn stale_ids(&self, max_age: Duration) -> Vec<String> {
        let endpoints = self.endpoints.read().await;
        endpoints
            .iter()
            .filter(|(_, e)| e.last_seen.elapsed() > max_age)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Evict all stale endpoints and return their ids
    pub async fn evict_stale(&self, max_age: Duration) -> Vec<String> {
        let stale = self.stale_ids(max_age).await;
        if !stale.is_empty() {
            let mut endpoints = self.endpoints.write().await;
            for id in &stale {
                endpoints.remove(id);
            }
        }
        stale
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
