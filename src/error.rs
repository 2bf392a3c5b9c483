//! Error types for the telemetry bridge

use thiserror::Error;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Upstream remote-control peer unreachable at {endpoint}: {source}")]
    UpstreamUnreachable {
        endpoint: String,
        #[source]
        source: NetworkError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport-level errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// A multipart message did not have the expected number of parts.
    /// All of its parts have already been consumed from the endpoint.
    #[error("Expected a {expected}-part message, got {got} parts")]
    Protocol { expected: usize, got: usize },

    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

/// Payload decoding errors (the whole record is dropped)
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed binary map payload: {0}")]
    MessagePack(#[from] rmp_serde::decode::Error),

    #[error("Unexpected payload root: expected {expected}, got {got}")]
    UnexpectedRoot {
        expected: &'static str,
        got: &'static str,
    },

    #[error("Expected exactly one record in the payload array, got {0}")]
    RecordCount(usize),

    #[error("Payload contains none of the recognized fields")]
    NoRecognizedFields,
}

/// Result type alias for the bridge
pub type Result<T> = std::result::Result<T, Error>;
