//! SkyLink Core
//!
//! The drone telemetry/command gateway and mission lifecycle engine behind
//! the SkyLink delivery platform. The gateway speaks JSON-over-UDP to drone
//! bridges; the mission store tracks deliveries from creation to completion.
//! The HTTP/CLI boundary consumes both through [`service::CoreService`].

pub mod config;
pub mod gateway;
pub mod mission;
pub mod persist;
pub mod service;

pub use skylink_shared as shared;
