//! # Pupil Bridge
//!
//! Relays eye-tracker telemetry to a recording controller over ZeroMQ.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐                      ┌──────────────────────┐
//! │   EYE TRACKER (PC)   │                      │  RECORDING CONTROLLER │
//! │  publisher  remote   │                      │       requester       │
//! └─────┬──────────▲─────┘                      └───────────┬───────────┘
//!       │ SUB      │ REQ "R" / "r"                          │ REP
//!       │ [topic|payload]                                   │ start / stop / receive_data
//!       ▼          │                                        ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        BRIDGE (bridge::Bridge)                      │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────────┐  │
//! │  │ Frame         │──▶│ Payload       │──▶│ Sample Buffer         │  │
//! │  │ Transport     │   │ Decoder       │   │ (recording::buffer)   │  │
//! │  │ (network)     │   │ (codec)       │   └───────────▲───────────┘  │
//! │  └───────────────┘   └───────────────┘               │ drain        │
//! │                                          ┌───────────┴───────────┐  │
//! │  ┌───────────────┐                       │ Control Dispatcher    │  │
//! │  │ Recorder      │◀──────────────────────│ (control)             │  │
//! │  │ (recording)   │   start / stop        └───────────────────────┘  │
//! │  └───────────────┘                                                  │
//! │                                                                     │
//! │  loop { drain every queued ingest message; serve one request }      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod codec;
pub mod config;
pub mod control;
pub mod error;
pub mod network;
pub mod recording;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Rendered in place of a field the sensor did not provide
    pub const SENTINEL: f64 = -1.0;

    /// Sensor telemetry publisher
    pub const DEFAULT_INGEST_ENDPOINT: &str = "tcp://localhost:5000";

    /// Controller-facing replier bind address
    pub const DEFAULT_CONTROL_ENDPOINT: &str = "tcp://*:6000";

    /// Sensor remote-control replier
    pub const DEFAULT_UPSTREAM_ENDPOINT: &str = "tcp://localhost:50020";

    /// Ingest reads poll without waiting
    pub const DEFAULT_INGEST_WAIT_MS: u64 = 0;

    /// Control wait per loop iteration
    pub const DEFAULT_CONTROL_WAIT_MS: u64 = 10;

    /// Sensor handshake acknowledgement wait
    pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 1000;

    /// Topic and payload
    pub const INGEST_MESSAGE_PARTS: usize = 2;

    /// Period of the statistics log line
    pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 5;

    /// The loop must turn at least this often
    pub const MIN_RECORDING_RATE_HZ: u64 = 10;
}
