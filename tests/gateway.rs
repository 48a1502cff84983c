//! Integration tests for the UDP gateway.
//!
//! These tests drive the complete drone-facing flows over real sockets:
//! - Handshake / telemetry datagrams -> registry + cache + fan-out
//! - Operator command -> dispatch back to the drone's endpoint
//! - Silence -> reaper eviction
//!
//! Run with: `cargo test --test gateway`

use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;

use skylink_core::config::GatewayConfig;
use skylink_core::persist::NullRepository;
use skylink_core::service::CoreService;
use skylink_shared::{now_ms, CommandEnvelope, CommandKind, TelemetryFrame};

struct Harness {
    service: Arc<CoreService>,
    drone: UdpSocket,
}

/// Bind a gateway on an ephemeral port, spawn its ingest loop, and pair it
/// with a drone-side socket aimed at it.
async fn start_gateway(config: GatewayConfig) -> Harness {
    let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.expect("gateway bind"));
    let gateway_addr = socket.local_addr().expect("gateway addr");

    let service = Arc::new(CoreService::new(socket, &config, Arc::new(NullRepository)));

    let ingest = service.ingest();
    tokio::spawn(async move {
        let _ = ingest.run().await;
    });

    let drone = UdpSocket::bind("127.0.0.1:0").await.expect("drone bind");
    drone.connect(gateway_addr).await.expect("drone connect");

    Harness { service, drone }
}

/// Ingestion is asynchronous; poll until the gateway sees the drone
async fn wait_until_connected(service: &CoreService, drone_id: &str) {
    for _ in 0..200 {
        if service.connected_drones().await.iter().any(|id| id == drone_id) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("drone {} never registered", drone_id);
}

#[tokio::test]
async fn handshake_then_command_round_trip() {
    let harness = start_gateway(GatewayConfig::default()).await;

    harness.drone.send(b"DRONE:falcon-1").await.expect("send handshake");
    wait_until_connected(&harness.service, "falcon-1").await;

    let command = CommandEnvelope::with_payload(
        "falcon-1",
        CommandKind::Waypoint,
        serde_json::json!({"lat": 14.7, "lon": 121.0, "alt": 60}),
    );
    harness.service.send_command(&command).await.expect("dispatch failed");

    let mut buf = [0u8; 2048];
    let len = timeout(Duration::from_secs(2), harness.drone.recv(&mut buf))
        .await
        .expect("command never arrived")
        .expect("recv failed");

    let text = std::str::from_utf8(&buf[..len]).expect("utf8");
    let (prefix, json) = text.split_once(':').expect("missing id prefix");
    assert_eq!(prefix, "falcon-1");
    let received: CommandEnvelope = serde_json::from_str(json).expect("parse failed");
    assert_eq!(received, command);
}

#[tokio::test]
async fn telemetry_without_handshake_self_registers() {
    let harness = start_gateway(GatewayConfig::default()).await;
    let mut stream = harness.service.subscribe_telemetry().await;

    harness
        .drone
        .send(br#"D1:{"latitude": 14.7, "battery": 40}"#)
        .await
        .expect("send telemetry");

    // The frame reaches subscribers with defaults applied
    let frame = timeout(Duration::from_secs(2), stream.recv())
        .await
        .expect("no frame streamed")
        .expect("fan-out closed");
    assert_eq!(frame.drone_id, "D1");
    assert_eq!(frame.battery, 40.0);
    assert_eq!(frame.latitude, 14.7);
    assert_eq!(frame.longitude, 0.0);
    assert_eq!(frame.signal_quality, 100.0);

    // ...lands in the latest-telemetry view
    let latest = harness.service.latest_telemetry().await;
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].drone_id, "D1");

    // ...and the drone is now addressable even though it never handshook
    wait_until_connected(&harness.service, "D1").await;
    let command = CommandEnvelope::new("D1", CommandKind::ReturnToBase);
    harness.service.send_command(&command).await.expect("dispatch failed");
}

#[tokio::test]
async fn command_to_unknown_drone_is_a_connectivity_error() {
    let harness = start_gateway(GatewayConfig::default()).await;

    let command = CommandEnvelope::new("ghost", CommandKind::Land);
    let err = harness.service.send_command(&command).await.unwrap_err();
    assert!(err.to_string().contains("not connected"));
}

#[tokio::test]
async fn silent_drone_is_reaped_and_unaddressable() {
    let config = GatewayConfig {
        stale_timeout: Duration::from_millis(50),
        reap_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let harness = start_gateway(config).await;

    harness.drone.send(b"DRONE:falcon-1").await.expect("send handshake");
    wait_until_connected(&harness.service, "falcon-1").await;

    // Go silent past the staleness threshold, then sweep
    tokio::time::sleep(Duration::from_millis(100)).await;
    let evicted = harness.service.reaper().sweep().await;
    assert_eq!(evicted, vec!["falcon-1".to_string()]);

    assert!(harness.service.connected_drones().await.is_empty());
    let command = CommandEnvelope::new("falcon-1", CommandKind::Resume);
    assert!(harness.service.send_command(&command).await.is_err());
}

#[tokio::test]
async fn heartbeats_keep_an_endpoint_alive() {
    let config = GatewayConfig {
        stale_timeout: Duration::from_millis(200),
        reap_interval: Duration::from_millis(200),
        ..Default::default()
    };
    let harness = start_gateway(config).await;

    harness.drone.send(b"DRONE:falcon-1").await.expect("send handshake");
    wait_until_connected(&harness.service, "falcon-1").await;

    // Heartbeat twice inside the staleness window
    for _ in 0..2 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        harness.drone.send(b"HEARTBEAT:falcon-1").await.expect("send heartbeat");
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(harness.service.reaper().sweep().await.is_empty());
    assert!(!harness.service.connected_drones().await.is_empty());
}

#[tokio::test]
async fn two_subscribers_share_one_frame_sequence() {
    let harness = start_gateway(GatewayConfig::default()).await;
    let mut first = harness.service.subscribe_telemetry().await;
    let mut second = harness.service.subscribe_telemetry().await;

    for battery in [90, 80, 70] {
        let body = format!(r#"D1:{{"battery": {}}}"#, battery);
        harness.drone.send(body.as_bytes()).await.expect("send telemetry");
    }

    for stream in [&mut first, &mut second] {
        for expected in [90.0, 80.0, 70.0] {
            let frame = timeout(Duration::from_secs(2), stream.recv())
                .await
                .expect("frame missing")
                .expect("fan-out closed");
            assert_eq!(frame.battery, expected);
        }
    }
}

#[tokio::test]
async fn pushed_mock_frames_flow_like_real_ones() {
    let harness = start_gateway(GatewayConfig::default()).await;
    let mut stream = harness.service.subscribe_telemetry().await;

    let frame = TelemetryFrame {
        drone_id: "mock-1".into(),
        battery: 66.0,
        latitude: 1.0,
        longitude: 2.0,
        altitude: 30.0,
        speed: 5.0,
        heading: 180.0,
        signal_quality: 80.0,
        status: Some("in-flight".into()),
        updated_at: now_ms(),
    };
    harness.service.push_frame(frame.clone()).await;

    assert_eq!(stream.recv().await.unwrap(), frame);
    assert_eq!(harness.service.latest_telemetry().await, vec![frame]);
}
