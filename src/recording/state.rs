//! Recording state machine

use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use super::upstream::{Directive, RemoteControl};
use crate::error::Result;

/// Pausable elapsed-time measurement
///
/// Created on the first start and reused afterwards: `restart` begins a new
/// segment, `stop` freezes it. `elapsed` reports the current or last
/// segment, `cumulative` the sum of all segments.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    segment_start: Instant,
    stopped_at: Option<Instant>,
    /// Total of all finished segments
    finished: Duration,
}

impl Stopwatch {
    /// A running stopwatch
    pub fn started() -> Self {
        Self {
            segment_start: Instant::now(),
            stopped_at: None,
            finished: Duration::ZERO,
        }
    }

    pub fn restart(&mut self) {
        if self.is_running() {
            self.finished += self.elapsed();
        }
        self.segment_start = Instant::now();
        self.stopped_at = None;
    }

    pub fn stop(&mut self) {
        if self.stopped_at.is_none() {
            let now = Instant::now();
            self.finished += now - self.segment_start;
            self.stopped_at = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        self.stopped_at.unwrap_or_else(Instant::now) - self.segment_start
    }

    pub fn cumulative(&self) -> Duration {
        if self.is_running() {
            self.finished + self.elapsed()
        } else {
            self.finished
        }
    }
}

/// Recording on/off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPhase {
    Stopped,
    Recording,
}

/// What a `start` request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRecording,
}

/// What a `stop` request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Recording ended; `elapsed` is the length of the segment just closed
    Stopped { elapsed: Duration },
    /// Nothing was ever recorded
    NoTimer,
    /// A previous session already ended
    NotRecording,
}

/// Recording state with its optional sensor handshake
pub struct Recorder {
    phase: RecordingPhase,
    stopwatch: Option<Stopwatch>,
    remote: Option<RemoteControl>,
    /// Completed start transitions
    sessions: u32,
}

impl Recorder {
    pub fn new(remote: Option<RemoteControl>) -> Self {
        Self {
            phase: RecordingPhase::Stopped,
            stopwatch: None,
            remote,
            sessions: 0,
        }
    }

    pub fn phase(&self) -> RecordingPhase {
        self.phase
    }

    pub fn is_recording(&self) -> bool {
        self.phase == RecordingPhase::Recording
    }

    pub fn stopwatch(&self) -> Option<&Stopwatch> {
        self.stopwatch.as_ref()
    }

    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Begin recording
    ///
    /// The sensor handshake runs first; if it fails the state is unchanged
    /// and the error is fatal to the caller.
    pub async fn start(&mut self) -> Result<StartOutcome> {
        if self.is_recording() {
            info!("Start requested while already recording");
            return Ok(StartOutcome::AlreadyRecording);
        }

        if let Some(remote) = self.remote.as_mut() {
            remote.send(Directive::Start).await?;
        }

        match self.stopwatch.as_mut() {
            Some(stopwatch) => stopwatch.restart(),
            None => self.stopwatch = Some(Stopwatch::started()),
        }
        self.phase = RecordingPhase::Recording;
        self.sessions += 1;

        info!("Recording started (session {})", self.sessions);
        Ok(StartOutcome::Started)
    }

    /// End recording
    pub async fn stop(&mut self) -> Result<StopOutcome> {
        if !self.is_recording() {
            let outcome = match self.stopwatch {
                None => StopOutcome::NoTimer,
                Some(_) => StopOutcome::NotRecording,
            };
            info!("Stop requested while stopped: {:?}", outcome);
            return Ok(outcome);
        }

        if let Some(remote) = self.remote.as_mut() {
            remote.send(Directive::Stop).await?;
        }

        self.phase = RecordingPhase::Stopped;
        let elapsed = match self.stopwatch.as_mut() {
            Some(stopwatch) => {
                stopwatch.stop();
                stopwatch.elapsed()
            }
            None => Duration::ZERO,
        };

        info!("Recording stopped after {:.3} s", elapsed.as_secs_f64());
        Ok(StopOutcome::Stopped { elapsed })
    }
}
