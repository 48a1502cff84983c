use skylink_core::config::GatewayConfig;
use skylink_core::persist::NullRepository;
use skylink_core::service::CoreService;
use std::sync::Arc;
use tokio::net::UdpSocket;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = GatewayConfig::from_env();
    info!("SkyLink gateway starting");
    info!("  UDP bind: {}", config.bind_addr);
    info!("  stale timeout: {:?}", config.stale_timeout);

    let socket = Arc::new(UdpSocket::bind(config.bind_addr).await?);
    let service = CoreService::new(socket, &config, Arc::new(NullRepository));

    // Reaper sweeps on its own timer
    let reaper = service.reaper();
    tokio::spawn(async move {
        reaper.run().await;
    });

    // Earnings audit log
    let missions = service.missions();
    tokio::spawn(async move {
        while let Some(event) = missions.next_earnings().await {
            info!(
                "earnings recorded: ${:.2} to operator {} for mission {}",
                event.amount, event.operator_id, event.mission_id
            );
        }
    });

    // Ingestion owns the socket loop until the process dies
    service.ingest().run().await
}
