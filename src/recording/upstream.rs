//! Handshake with the sensor's remote-control endpoint

use bytes::Bytes;
use std::time::Duration;
use tracing::info;

use crate::error::{Error, Result};
use crate::network::{request_reply, FrameEndpoint};

/// Directive forwarded to the sensor when recording starts or stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Start,
    Stop,
}

/// Requester link to the sensor's remote-control endpoint
pub struct RemoteControl {
    link: Box<dyn FrameEndpoint>,
    start_command: Bytes,
    stop_command: Bytes,
    timeout: Duration,
    /// Handshakes acknowledged so far
    acknowledged: u64,
}

impl RemoteControl {
    pub fn new(
        link: Box<dyn FrameEndpoint>,
        start_command: impl Into<Bytes>,
        stop_command: impl Into<Bytes>,
        timeout: Duration,
    ) -> Self {
        Self {
            link,
            start_command: start_command.into(),
            stop_command: stop_command.into(),
            timeout,
            acknowledged: 0,
        }
    }

    /// Send a directive and wait for its acknowledgement
    ///
    /// Any failure, a timeout included, is [`Error::UpstreamUnreachable`]:
    /// the recording session cannot be trusted without the sensor agreeing.
    pub async fn send(&mut self, directive: Directive) -> Result<String> {
        let command = match directive {
            Directive::Start => self.start_command.clone(),
            Directive::Stop => self.stop_command.clone(),
        };

        let reply = request_reply(self.link.as_mut(), command, self.timeout)
            .await
            .map_err(|source| Error::UpstreamUnreachable {
                endpoint: self.link.describe().to_string(),
                source,
            })?;

        self.acknowledged += 1;
        let reply = String::from_utf8_lossy(&reply).into_owned();
        info!("Remote control acknowledged {:?}: {}", directive, reply);
        Ok(reply)
    }

    pub fn acknowledged(&self) -> u64 {
        self.acknowledged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::network::MockEndpoint;

    #[tokio::test]
    async fn test_directives_use_configured_commands() {
        let peer = MockEndpoint::new("remote");
        peer.reply_with("OK");
        let mut remote =
            RemoteControl::new(Box::new(peer.clone()), "R", "r", Duration::from_secs(1));

        assert_eq!(remote.send(Directive::Start).await.unwrap(), "OK");
        assert_eq!(remote.send(Directive::Stop).await.unwrap(), "OK");
        assert_eq!(peer.sent(), vec![Bytes::from("R"), Bytes::from("r")]);
        assert_eq!(remote.acknowledged(), 2);
    }

    #[tokio::test]
    async fn test_silent_peer_is_fatal() {
        let peer = MockEndpoint::new("remote");
        let mut remote =
            RemoteControl::new(Box::new(peer), "R", "r", Duration::from_millis(1000));

        let err = remote.send(Directive::Start).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UpstreamUnreachable {
                source: NetworkError::Timeout(1000),
                ..
            }
        ));
    }
}
