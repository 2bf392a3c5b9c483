//! Event loop counters

use tracing::info;

use crate::codec::DecoderStats;
use crate::recording::SampleBufferStats;

/// Counters kept by the event loop itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeStats {
    /// Well-formed ingest messages received
    pub messages_received: u64,
    /// Messages on topics outside the subscription prefixes
    pub messages_filtered: u64,
    /// Messages dropped for having the wrong number of parts
    pub protocol_desyncs: u64,
    /// Decoded samples appended to the buffer
    pub samples_buffered: u64,
    /// Decoded samples dropped because recording was off
    pub samples_discarded: u64,
    /// Control requests answered
    pub requests_served: u64,
    /// Failed ingest reads, truncated messages included
    pub ingest_errors: u64,
    /// Failed control reads or replies
    pub control_errors: u64,
}

/// What one loop iteration did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub messages_drained: usize,
    pub samples_buffered: usize,
    pub desyncs: usize,
    pub transport_errors: usize,
    pub request_served: bool,
}

/// Periodic summary line
pub fn log_summary(bridge: &BridgeStats, decoder: &DecoderStats, buffer: &SampleBufferStats) {
    info!(
        "Bridge stats: {} messages ({} filtered, {} desynced), {} decoded, {} rejected, {} field warnings, {} buffered / {} discarded, buffer depth {} (peak {}), {} requests, {} ingest / {} control errors",
        bridge.messages_received,
        bridge.messages_filtered,
        bridge.protocol_desyncs,
        decoder.payloads_decoded,
        decoder.payloads_rejected,
        decoder.field_warnings,
        bridge.samples_buffered,
        bridge.samples_discarded,
        buffer.depth,
        buffer.high_water,
        bridge.requests_served,
        bridge.ingest_errors,
        bridge.control_errors
    );
}
