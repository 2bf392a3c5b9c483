//! The bridge process: ingest drain, control service and their counters

pub mod event_loop;
pub mod stats;

pub use event_loop::Bridge;
pub use stats::{BridgeStats, StepReport};
