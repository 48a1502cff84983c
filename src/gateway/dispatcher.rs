//! Command dispatcher for sending operator commands to drones
//!
//! Dispatch is fire-and-forget over the same unreliable transport the
//! drones report on: no acknowledgment, no retry. A command to a drone
//! with no live endpoint is a hard failure, never a silent drop.

use crate::gateway::registry::EndpointRegistry;
use skylink_shared::{codec, CommandEnvelope};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::info;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("drone not connected: {0}")]
    DroneNotConnected(String),

    #[error("failed to encode command: {0}")]
    Encode(#[from] codec::CodecError),

    #[error("udp send failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Sends serialized commands to the endpoint a drone last reported from
pub struct CommandDispatcher {
    socket: Arc<UdpSocket>,
    registry: Arc<EndpointRegistry>,
}

impl CommandDispatcher {
    pub fn new(socket: Arc<UdpSocket>, registry: Arc<EndpointRegistry>) -> Self {
        Self { socket, registry }
    }

    /// Resolve the target endpoint and transmit the command as one datagram
    pub async fn send(&self, command: &CommandEnvelope) -> Result<(), DispatchError> {
        let addr = self
            .registry
            .resolve(&command.drone_id)
            .await
            .ok_or_else(|| DispatchError::DroneNotConnected(command.drone_id.clone()))?;

        let datagram = codec::encode_command(command)?;
        self.socket.send_to(&datagram, addr).await?;

        info!(
            "sent {:?} command to {} at {}",
            command.kind, command.drone_id, addr
        );
        Ok(())
    }
}
