//! Recording subsystem: sample buffer, recording state and sensor handshake

pub mod buffer;
pub mod state;
pub mod upstream;

pub use buffer::{render_samples, SampleBuffer, SampleBufferStats};
pub use state::{Recorder, RecordingPhase, StartOutcome, StopOutcome, Stopwatch};
pub use upstream::{Directive, RemoteControl};
