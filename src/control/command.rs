//! Control channel vocabulary

use bytes::Bytes;
use std::time::Duration;

/// A request from the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    ReceiveData,
    /// Anything else, kept for logging
    Unknown(String),
}

impl Command {
    /// Parse a raw request; matching is exact and case-sensitive
    pub fn parse(raw: &[u8]) -> Self {
        match raw {
            b"start" => Command::Start,
            b"stop" => Command::Stop,
            b"receive_data" => Command::ReceiveData,
            other => Command::Unknown(String::from_utf8_lossy(other).into_owned()),
        }
    }
}

/// A reply to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ack,
    AlreadyRecording,
    /// Seconds recorded in the segment that just ended
    Elapsed(Duration),
    NoTimer,
    NotRecording,
    NoData,
    /// Rendered sample blocks
    Data(String),
    UnknownRequest,
}

impl Reply {
    pub fn into_bytes(self) -> Bytes {
        match self {
            Reply::Ack => Bytes::from_static(b"ack"),
            Reply::AlreadyRecording => Bytes::from_static(b"already recording"),
            Reply::Elapsed(elapsed) => Bytes::from(format!("{:.6}", elapsed.as_secs_f64())),
            Reply::NoTimer => Bytes::from_static(b"no timer"),
            Reply::NotRecording => Bytes::from_static(b"not recording"),
            Reply::NoData => Bytes::from_static(b"no data"),
            Reply::Data(text) => Bytes::from(text),
            Reply::UnknownRequest => Bytes::from_static(b"unknown request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact() {
        assert_eq!(Command::parse(b"start"), Command::Start);
        assert_eq!(Command::parse(b"stop"), Command::Stop);
        assert_eq!(Command::parse(b"receive_data"), Command::ReceiveData);
        assert_eq!(Command::parse(b"Start"), Command::Unknown("Start".into()));
        assert_eq!(Command::parse(b"start\n"), Command::Unknown("start\n".into()));
        assert_eq!(Command::parse(b""), Command::Unknown(String::new()));
    }

    #[test]
    fn test_elapsed_reply_is_numeric() {
        let reply = Reply::Elapsed(Duration::from_millis(2500)).into_bytes();
        assert_eq!(reply, Bytes::from("2.500000"));
    }

    #[test]
    fn test_stopped_replies_are_not_numeric() {
        for reply in [Reply::NoTimer, Reply::NotRecording] {
            let text = String::from_utf8(reply.into_bytes().to_vec()).unwrap();
            assert!(text.parse::<f64>().is_err());
        }
    }
}
