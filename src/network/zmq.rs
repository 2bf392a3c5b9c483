//! ZeroMQ endpoints
//!
//! Pure Rust ZeroMQ sockets adapted to [`FrameEndpoint`]. A ZeroMQ message
//! arrives whole; its parts are queued locally and handed out one at a time
//! with the `more` flag set on all but the last, which is what the
//! multipart helpers expect.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::info;
use zeromq::{
    RepSocket, ReqSocket, Socket, SocketRecv, SocketSend, SubSocket, ZmqMessage, ZmqResult,
};

use super::endpoint::{Frame, FrameEndpoint};
use crate::error::NetworkError;

enum Role {
    Subscriber(SubSocket),
    Replier(RepSocket),
    Requester(ReqSocket),
}

/// A connected or bound ZeroMQ socket
pub struct ZmqEndpoint {
    role: Role,
    endpoint: String,
    /// Parts of the last received message not yet handed out
    pending: VecDeque<Bytes>,
}

impl ZmqEndpoint {
    fn with_role(role: Role, endpoint: &str) -> Self {
        Self {
            role,
            endpoint: endpoint.to_string(),
            pending: VecDeque::new(),
        }
    }

    /// Connect a subscriber and register topic prefixes
    ///
    /// An empty `topics` list subscribes to everything.
    pub async fn subscriber(endpoint: &str, topics: &[String]) -> Result<Self, NetworkError> {
        let mut socket = SubSocket::new();
        socket.connect(endpoint).await.map_err(|e| {
            NetworkError::ConnectionFailed(format!("SUB connect to {}: {}", endpoint, e))
        })?;

        if topics.is_empty() {
            socket
                .subscribe("")
                .await
                .map_err(|e| NetworkError::ConnectionFailed(format!("subscribe: {}", e)))?;
        }
        for topic in topics {
            socket.subscribe(topic).await.map_err(|e| {
                NetworkError::ConnectionFailed(format!("subscribe to '{}': {}", topic, e))
            })?;
        }

        info!("Subscribed to {} (topics: {:?})", endpoint, topics);
        Ok(Self::with_role(Role::Subscriber(socket), endpoint))
    }

    /// Bind a replier for the control channel
    pub async fn replier(endpoint: &str) -> Result<Self, NetworkError> {
        let mut socket = RepSocket::new();
        let bound = socket
            .bind(endpoint)
            .await
            .map_err(|e| NetworkError::BindFailed(format!("REP bind to {}: {}", endpoint, e)))?;

        info!("Control replier bound on {}", bound);
        Ok(Self::with_role(Role::Replier(socket), endpoint))
    }

    /// Connect a requester
    pub async fn requester(endpoint: &str) -> Result<Self, NetworkError> {
        let mut socket = ReqSocket::new();
        socket.connect(endpoint).await.map_err(|e| {
            NetworkError::ConnectionFailed(format!("REQ connect to {}: {}", endpoint, e))
        })?;

        info!("Requester connected to {}", endpoint);
        Ok(Self::with_role(Role::Requester(socket), endpoint))
    }

    async fn recv_message(&mut self) -> ZmqResult<ZmqMessage> {
        match &mut self.role {
            Role::Subscriber(socket) => socket.recv().await,
            Role::Replier(socket) => socket.recv().await,
            Role::Requester(socket) => socket.recv().await,
        }
    }
}

#[async_trait]
impl FrameEndpoint for ZmqEndpoint {
    async fn recv_part(&mut self, wait: Duration) -> Result<Option<Frame>, NetworkError> {
        if self.pending.is_empty() {
            match tokio::time::timeout(wait, self.recv_message()).await {
                Err(_elapsed) => return Ok(None),
                Ok(Err(e)) => {
                    return Err(NetworkError::ReceiveFailed(format!(
                        "{}: {}",
                        self.endpoint, e
                    )))
                }
                Ok(Ok(message)) => self.pending.extend(message.into_vec()),
            }
        }

        Ok(self.pending.pop_front().map(|data| Frame {
            data,
            more: !self.pending.is_empty(),
        }))
    }

    async fn send_frame(&mut self, data: Bytes) -> Result<(), NetworkError> {
        let message = ZmqMessage::from(data);
        let result = match &mut self.role {
            Role::Subscriber(_) => {
                return Err(NetworkError::SendFailed(format!(
                    "{} is a subscriber and cannot send",
                    self.endpoint
                )))
            }
            Role::Replier(socket) => socket.send(message).await,
            Role::Requester(socket) => socket.send(message).await,
        };

        result.map_err(|e| NetworkError::SendFailed(format!("{}: {}", self.endpoint, e)))
    }

    fn describe(&self) -> &str {
        &self.endpoint
    }
}
