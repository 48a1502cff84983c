//! Wire codec for the gateway's UDP datagrams
//!
//! Inbound datagrams are line-oriented text in one of three shapes:
//! ```text
//! DRONE:<droneId>          handshake, registers the sender's endpoint
//! HEARTBEAT:<droneId>      liveness refresh for an existing endpoint
//! <droneId>:<json>         telemetry body with optional numeric fields
//! ```
//!
//! Outbound commands are framed the same way the drone bridge expects:
//! `<droneId>:<command json>` in a single datagram.
//!
//! The UDP port is a public, untrusted boundary: classification returns a
//! typed error for anything unparseable and callers drop the datagram.

use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::{now_ms, CommandEnvelope, TelemetryFrame};

const HANDSHAKE_PREFIX: &str = "DRONE:";
const HEARTBEAT_PREFIX: &str = "HEARTBEAT:";

/// Defaults applied to telemetry fields absent from the JSON body. Cache
/// consumers never see a missing field.
pub const DEFAULT_BATTERY: f64 = 100.0;
pub const DEFAULT_SIGNAL_QUALITY: f64 = 100.0;

/// Errors from classifying an inbound datagram
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("datagram is not valid UTF-8")]
    NotUtf8,

    #[error("datagram matches no known format")]
    UnknownFormat,

    #[error("empty drone id")]
    EmptyDroneId,

    #[error("malformed JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("JSON body carries no telemetry fields")]
    NotTelemetry,
}

/// A classified inbound datagram
#[derive(Debug, Clone, PartialEq)]
pub enum Datagram {
    /// Explicit connect from a drone bridge
    Handshake { drone_id: String },
    /// Liveness refresh only; never registers a new endpoint
    Heartbeat { drone_id: String },
    /// Telemetry snapshot, defaults already applied and timestamp stamped
    Telemetry(TelemetryFrame),
}

/// Raw telemetry body as it appears on the wire. Every field is optional;
/// defaults are applied when building the frame.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TelemetryBody {
    drone_id: Option<String>,
    battery: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f64>,
    speed: Option<f64>,
    heading: Option<f64>,
    signal_quality: Option<f64>,
    status: Option<String>,
}

/// Classify an inbound datagram, in the order the bridge protocol defines:
/// handshake, then heartbeat, then id-prefixed telemetry JSON.
pub fn classify(payload: &[u8]) -> Result<Datagram, CodecError> {
    let text = std::str::from_utf8(payload).map_err(|_| CodecError::NotUtf8)?;

    if let Some(rest) = text.strip_prefix(HANDSHAKE_PREFIX) {
        return Ok(Datagram::Handshake {
            drone_id: parse_drone_id(rest)?,
        });
    }

    if let Some(rest) = text.strip_prefix(HEARTBEAT_PREFIX) {
        return Ok(Datagram::Heartbeat {
            drone_id: parse_drone_id(rest)?,
        });
    }

    let (prefix, body) = text.split_once(':').ok_or(CodecError::UnknownFormat)?;
    let prefix_id = parse_drone_id(prefix)?;
    let body: TelemetryBody = serde_json::from_str(body)?;

    // A body with neither position nor battery is not telemetry; raw binary
    // MAVLink lands here too and is dropped upstream.
    if body.latitude.is_none() && body.battery.is_none() {
        return Err(CodecError::NotTelemetry);
    }

    // The body may carry its own drone id; it wins over the prefix.
    let drone_id = body
        .drone_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(prefix_id);

    Ok(Datagram::Telemetry(TelemetryFrame {
        drone_id,
        battery: body.battery.unwrap_or(DEFAULT_BATTERY),
        latitude: body.latitude.unwrap_or(0.0),
        longitude: body.longitude.unwrap_or(0.0),
        altitude: body.altitude.unwrap_or(0.0),
        speed: body.speed.unwrap_or(0.0),
        heading: body.heading.unwrap_or(0.0),
        signal_quality: body.signal_quality.unwrap_or(DEFAULT_SIGNAL_QUALITY),
        status: body.status,
        updated_at: now_ms(),
    }))
}

/// Encode a command envelope into a single outbound datagram
pub fn encode_command(command: &CommandEnvelope) -> Result<Bytes, CodecError> {
    let json = serde_json::to_string(command)?;
    Ok(Bytes::from(format!("{}:{}", command.drone_id, json)))
}

fn parse_drone_id(raw: &str) -> Result<String, CodecError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(CodecError::EmptyDroneId);
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandKind;

    #[test]
    fn test_classify_handshake() {
        let datagram = classify(b"DRONE:falcon-1").expect("classify failed");
        assert_eq!(
            datagram,
            Datagram::Handshake {
                drone_id: "falcon-1".into()
            }
        );
    }

    #[test]
    fn test_classify_heartbeat_trims_id() {
        let datagram = classify(b"HEARTBEAT:falcon-1\n").expect("classify failed");
        assert_eq!(
            datagram,
            Datagram::Heartbeat {
                drone_id: "falcon-1".into()
            }
        );
    }

    #[test]
    fn test_handshake_without_id_rejected() {
        let result = classify(b"DRONE:");
        assert!(matches!(result, Err(CodecError::EmptyDroneId)));
    }

    #[test]
    fn test_telemetry_defaults_applied() {
        let datagram =
            classify(br#"D1:{"latitude": 14.7, "battery": 40}"#).expect("classify failed");

        let Datagram::Telemetry(frame) = datagram else {
            panic!("expected telemetry");
        };
        assert_eq!(frame.drone_id, "D1");
        assert_eq!(frame.battery, 40.0);
        assert_eq!(frame.latitude, 14.7);
        assert_eq!(frame.longitude, 0.0);
        assert_eq!(frame.altitude, 0.0);
        assert_eq!(frame.speed, 0.0);
        assert_eq!(frame.heading, 0.0);
        assert_eq!(frame.signal_quality, 100.0);
        assert!(frame.status.is_none());
        assert!(frame.updated_at > 0);
    }

    #[test]
    fn test_telemetry_full_body() {
        let datagram = classify(
            br#"D2:{"battery":88,"latitude":1.5,"longitude":2.5,"altitude":120,"speed":14.2,"heading":270,"signalQuality":92,"status":"in-flight"}"#,
        )
        .expect("classify failed");

        let Datagram::Telemetry(frame) = datagram else {
            panic!("expected telemetry");
        };
        assert_eq!(frame.heading, 270.0);
        assert_eq!(frame.signal_quality, 92.0);
        assert_eq!(frame.status.as_deref(), Some("in-flight"));
    }

    #[test]
    fn test_telemetry_body_id_wins_over_prefix() {
        let datagram =
            classify(br#"bridge-7:{"droneId":"falcon-2","battery":55}"#).expect("classify failed");

        let Datagram::Telemetry(frame) = datagram else {
            panic!("expected telemetry");
        };
        assert_eq!(frame.drone_id, "falcon-2");
    }

    #[test]
    fn test_json_without_telemetry_fields_rejected() {
        let result = classify(br#"D1:{"hello":"world"}"#);
        assert!(matches!(result, Err(CodecError::NotTelemetry)));
    }

    #[test]
    fn test_non_object_body_rejected() {
        let result = classify(br#"D1:[1,2,3]"#);
        assert!(matches!(result, Err(CodecError::MalformedBody(_))));
    }

    #[test]
    fn test_garbage_rejected_without_panic() {
        assert!(matches!(
            classify(b"not a datagram"),
            Err(CodecError::UnknownFormat)
        ));
        assert!(matches!(
            classify(&[0xff, 0xfe, 0x00, 0x7f]),
            Err(CodecError::NotUtf8)
        ));
        assert!(matches!(
            classify(b"D1:not json at all"),
            Err(CodecError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_encode_command_frames_with_id_prefix() {
        let cmd = CommandEnvelope::with_payload(
            "falcon-1",
            CommandKind::Waypoint,
            serde_json::json!({"lat": 14.7, "lon": 121.0}),
        );
        let datagram = encode_command(&cmd).expect("encode failed");
        let text = std::str::from_utf8(&datagram).expect("utf8");

        let (prefix, json) = text.split_once(':').expect("missing prefix");
        assert_eq!(prefix, "falcon-1");
        let parsed: CommandEnvelope = serde_json::from_str(json).expect("parse failed");
        assert_eq!(parsed, cmd);
    }
}
