//! Gateway configuration

use skylink_shared::liveness;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Configuration for the UDP gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the UDP socket binds to
    pub bind_addr: SocketAddr,
    /// Endpoints silent longer than this are reaped
    pub stale_timeout: Duration,
    /// Period between reaper sweeps
    pub reap_interval: Duration,
    /// Per-subscriber telemetry buffer, in frames
    pub fanout_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, liveness::DEFAULT_GATEWAY_PORT)),
            stale_timeout: Duration::from_millis(liveness::STALE_TIMEOUT_MS),
            reap_interval: Duration::from_millis(liveness::REAP_INTERVAL_MS),
            fanout_buffer: liveness::FANOUT_BUFFER_FRAMES,
        }
    }
}

impl GatewayConfig {
    /// Build a config from the environment, falling back to defaults.
    /// `SKYLINK_UDP_PORT` overrides the listen port.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(port) = std::env::var("SKYLINK_UDP_PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.bind_addr.set_port(port),
                Err(_) => tracing::warn!("ignoring invalid SKYLINK_UDP_PORT: {}", port),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_liveness_constants() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind_addr.port(), liveness::DEFAULT_GATEWAY_PORT);
        assert_eq!(config.stale_timeout, Duration::from_secs(30));
        assert_eq!(config.reap_interval, Duration::from_secs(30));
    }
}
