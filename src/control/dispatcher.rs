//! Control request dispatcher

use bytes::Bytes;
use tracing::{info, warn};

use super::command::{Command, Reply};
use crate::codec::Field;
use crate::error::Result;
use crate::recording::{render_samples, Recorder, SampleBuffer, StartOutcome, StopOutcome};

/// Turns controller requests into recorder and buffer actions
pub struct Dispatcher {
    layout: &'static [(&'static str, Field)],
    requests_served: u64,
    unknown_requests: u64,
}

impl Dispatcher {
    /// `layout` fixes the field names and order of `receive_data` replies
    pub fn new(layout: &'static [(&'static str, Field)]) -> Self {
        Self {
            layout,
            requests_served: 0,
            unknown_requests: 0,
        }
    }

    /// Handle one raw request and produce the raw reply
    ///
    /// Only a failed sensor handshake is an error; every other request,
    /// unknown ones included, gets a reply.
    pub async fn handle_request(
        &mut self,
        raw: &[u8],
        recorder: &mut Recorder,
        buffer: &mut SampleBuffer,
    ) -> Result<Bytes> {
        let reply = self.dispatch(Command::parse(raw), recorder, buffer).await?;
        self.requests_served += 1;
        Ok(reply.into_bytes())
    }

    pub async fn dispatch(
        &mut self,
        command: Command,
        recorder: &mut Recorder,
        buffer: &mut SampleBuffer,
    ) -> Result<Reply> {
        let reply = match command {
            Command::Start => match recorder.start().await? {
                StartOutcome::Started => Reply::Ack,
                StartOutcome::AlreadyRecording => Reply::AlreadyRecording,
            },
            Command::Stop => match recorder.stop().await? {
                StopOutcome::Stopped { elapsed } => Reply::Elapsed(elapsed),
                StopOutcome::NoTimer => Reply::NoTimer,
                StopOutcome::NotRecording => Reply::NotRecording,
            },
            Command::ReceiveData => {
                let samples = buffer.take_all();
                if samples.is_empty() {
                    Reply::NoData
                } else {
                    info!("Handing {} samples to the controller", samples.len());
                    Reply::Data(render_samples(&samples, self.layout))
                }
            }
            Command::Unknown(request) => {
                warn!("Unknown request: {:?}", request);
                self.unknown_requests += 1;
                Reply::UnknownRequest
            }
        };

        Ok(reply)
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served
    }

    pub fn unknown_requests(&self) -> u64 {
        self.unknown_requests
    }
}
