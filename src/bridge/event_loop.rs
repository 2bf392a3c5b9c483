//! Ingest-and-control event loop
//!
//! Each iteration drains every ingest message that is already queued, then
//! makes one bounded-wait attempt to serve a control request. The ingest
//! wait is normally zero so the control channel is never starved, and the
//! control wait is short so ingest is drained at the sensor's rate.

use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::stats::{log_summary, BridgeStats, StepReport};
use crate::codec::{DecoderStats, PayloadDecoder};
use crate::config::BridgeConfig;
use crate::control::{Dispatcher, Reply};
use crate::error::{NetworkError, Result};
use crate::network::{receive_frame, receive_multipart, FrameEndpoint, ZmqEndpoint};
use crate::recording::{Recorder, RemoteControl, SampleBuffer};

/// The whole bridge: endpoints, decoder, buffer and recording state
pub struct Bridge {
    ingest: Box<dyn FrameEndpoint>,
    control: Box<dyn FrameEndpoint>,
    decoder: PayloadDecoder,
    buffer: SampleBuffer,
    recorder: Recorder,
    dispatcher: Dispatcher,
    topics: Vec<String>,
    ingest_wait: Duration,
    control_wait: Duration,
    message_parts: usize,
    dump_frames: bool,
    stats_interval: Option<Duration>,
    stats: BridgeStats,
}

impl Bridge {
    /// Assemble a bridge around already-open endpoints
    pub fn new(
        config: &BridgeConfig,
        ingest: Box<dyn FrameEndpoint>,
        control: Box<dyn FrameEndpoint>,
        remote: Option<RemoteControl>,
    ) -> Self {
        Self {
            ingest,
            control,
            decoder: PayloadDecoder::new(config.decoder),
            buffer: SampleBuffer::new(),
            recorder: Recorder::new(remote),
            dispatcher: Dispatcher::new(config.decoder.reply_layout()),
            topics: config.topics(),
            ingest_wait: config.ingest.wait(),
            control_wait: config.control.wait(),
            message_parts: config.ingest.max_parts,
            dump_frames: config.logging.dump_frames,
            stats_interval: config.logging.stats_interval(),
            stats: BridgeStats::default(),
        }
    }

    /// Open the ZeroMQ sockets described by `config`
    pub async fn connect(config: &BridgeConfig) -> Result<Self> {
        let topics = config.topics();
        let ingest = ZmqEndpoint::subscriber(&config.ingest.endpoint, &topics).await?;
        let control = ZmqEndpoint::replier(&config.control.endpoint).await?;

        let remote = match &config.upstream {
            Some(upstream) => {
                let link = ZmqEndpoint::requester(&upstream.endpoint).await?;
                Some(RemoteControl::new(
                    Box::new(link),
                    upstream.start_command.clone(),
                    upstream.stop_command.clone(),
                    upstream.timeout(),
                ))
            }
            None => None,
        };

        Ok(Self::new(config, Box::new(ingest), Box::new(control), remote))
    }

    /// Run forever
    ///
    /// Transport errors are logged and counted; only a failed sensor
    /// handshake ([`crate::Error::UpstreamUnreachable`]) ends the loop.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Bridge running: {} decoder, ingest from {}, control on {}",
            self.decoder.format(),
            self.ingest.describe(),
            self.control.describe()
        );

        let mut last_stats_time = Instant::now();
        loop {
            self.step().await?;

            if let Some(interval) = self.stats_interval {
                if last_stats_time.elapsed() >= interval {
                    last_stats_time = Instant::now();
                    self.log_stats();
                }
            }
        }
    }

    /// One loop iteration: drain ingest, then serve at most one request
    pub async fn step(&mut self) -> Result<StepReport> {
        let mut report = StepReport::default();
        self.drain_ingest(&mut report).await;
        report.request_served = self.service_control(&mut report).await?;
        Ok(report)
    }

    /// Consume every ingest message currently available
    pub async fn drain_ingest(&mut self, report: &mut StepReport) {
        loop {
            match receive_multipart(self.ingest.as_mut(), self.ingest_wait, self.message_parts).await {
                Ok(Some(parts)) => {
                    report.messages_drained += 1;
                    if self.handle_message(&parts) {
                        report.samples_buffered += 1;
                    }
                }
                Ok(None) => return,
                Err(NetworkError::Protocol { expected, got }) => {
                    report.desyncs += 1;
                    self.stats.protocol_desyncs += 1;
                    warn!(
                        "Dropping ingest message with {} parts (expected {})",
                        got, expected
                    );
                }
                Err(e) => {
                    report.transport_errors += 1;
                    self.stats.ingest_errors += 1;
                    warn!("Ingest receive failed: {}", e);
                    return;
                }
            }
        }
    }

    /// Decode one ingest message; returns whether a sample was buffered
    fn handle_message(&mut self, parts: &[Bytes]) -> bool {
        let (topic, payload) = match parts {
            [payload] => (None, payload),
            [topic, .., payload] => (Some(String::from_utf8_lossy(topic)), payload),
            [] => return false,
        };
        self.stats.messages_received += 1;

        if let Some(topic) = &topic {
            if !self.topics.is_empty() && !self.topics.iter().any(|t| topic.starts_with(t.as_str())) {
                self.stats.messages_filtered += 1;
                debug!("Ignoring message on topic '{}'", topic);
                return false;
            }
        }

        let topic = topic.as_deref().unwrap_or("");
        if self.dump_frames {
            debug!("{}: {}", topic, String::from_utf8_lossy(payload));
        }

        let sample = match self.decoder.decode(payload) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Failed to decode payload on '{}': {}", topic, e);
                return false;
            }
        };

        if !self.recorder.is_recording() {
            self.stats.samples_discarded += 1;
            return false;
        }

        self.buffer.push(sample);
        self.stats.samples_buffered += 1;
        true
    }

    /// Wait briefly for one control request and answer it
    ///
    /// Returns whether a reply went out. A request whose reply could not be
    /// sent has still been acted on.
    pub async fn service_control(&mut self, report: &mut StepReport) -> Result<bool> {
        let reply = match receive_frame(self.control.as_mut(), self.control_wait).await {
            Ok(None) => return Ok(false),
            Ok(Some(request)) => {
                debug!("Control request: {:?}", String::from_utf8_lossy(&request));
                self.dispatcher
                    .handle_request(&request, &mut self.recorder, &mut self.buffer)
                    .await?
            }
            // The replier still owes an answer for a malformed request
            Err(NetworkError::Protocol { got, .. }) => {
                warn!("Control request arrived in {} parts", got);
                Reply::UnknownRequest.into_bytes()
            }
            Err(e) => {
                report.transport_errors += 1;
                self.stats.control_errors += 1;
                warn!("Control receive failed: {}", e);
                return Ok(false);
            }
        };

        if let Err(e) = self.control.send_frame(reply).await {
            report.transport_errors += 1;
            self.stats.control_errors += 1;
            warn!("Failed to send control reply: {}", e);
            return Ok(false);
        }
        self.stats.requests_served += 1;
        Ok(true)
    }

    pub fn log_stats(&self) {
        log_summary(&self.stats, &self.decoder.stats(), &self.buffer.stats());
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }
}
