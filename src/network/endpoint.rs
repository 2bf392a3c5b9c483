//! Frame-level endpoint abstraction
//!
//! Every socket the bridge talks to is reduced to "receive the next message
//! part within a bounded wait" and "send one single-part frame". Multipart
//! framing, desync recovery and request/reply exchanges are built on top of
//! those two primitives so they behave identically over ZeroMQ and over the
//! in-memory mock endpoints.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::warn;

use crate::error::NetworkError;

/// One message part as it arrives from an endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub data: Bytes,
    /// More parts of the same message follow
    pub more: bool,
}

/// A socket that delivers message parts and accepts single-part frames
#[async_trait]
pub trait FrameEndpoint: Send {
    /// Receive the next message part, waiting at most `wait`
    ///
    /// Returns `Ok(None)` when nothing arrived in time. A zero wait still
    /// returns a part that is already queued.
    async fn recv_part(&mut self, wait: Duration) -> Result<Option<Frame>, NetworkError>;

    /// Send a single-part message
    async fn send_frame(&mut self, data: Bytes) -> Result<(), NetworkError>;

    /// Human-readable address, for logs
    fn describe(&self) -> &str;
}

/// Read the remaining parts of a message so the next read starts clean
async fn drain_rest<E>(endpoint: &mut E, wait: Duration) -> Result<usize, NetworkError>
where
    E: FrameEndpoint + ?Sized,
{
    let mut drained = 0;
    while let Some(frame) = endpoint.recv_part(wait).await? {
        drained += 1;
        if !frame.more {
            return Ok(drained);
        }
    }

    warn!(
        "Message on {} ended without a final part after {} extra parts",
        endpoint.describe(),
        drained
    );
    Ok(drained)
}

/// Receive a single-part message
///
/// A multipart message is consumed entirely and reported as
/// [`NetworkError::Protocol`].
pub async fn receive_frame<E>(endpoint: &mut E, wait: Duration) -> Result<Option<Bytes>, NetworkError>
where
    E: FrameEndpoint + ?Sized,
{
    let Some(frame) = endpoint.recv_part(wait).await? else {
        return Ok(None);
    };

    if frame.more {
        let extra = drain_rest(endpoint, wait).await?;
        return Err(NetworkError::Protocol {
            expected: 1,
            got: 1 + extra,
        });
    }

    Ok(Some(frame.data))
}

/// Receive a message made of exactly `parts` parts
///
/// Whatever the sender produced, every part of the message is consumed
/// before returning, so a malformed message never desynchronizes the next
/// read. Messages with a different part count yield
/// [`NetworkError::Protocol`].
pub async fn receive_multipart<E>(
    endpoint: &mut E,
    wait: Duration,
    parts: usize,
) -> Result<Option<Vec<Bytes>>, NetworkError>
where
    E: FrameEndpoint + ?Sized,
{
    let Some(first) = endpoint.recv_part(wait).await? else {
        return Ok(None);
    };

    let mut more = first.more;
    let mut received = vec![first.data];

    while more {
        match endpoint.recv_part(wait).await? {
            Some(frame) => {
                more = frame.more;
                if received.len() < parts {
                    received.push(frame.data);
                } else {
                    let extra = if more { drain_rest(endpoint, wait).await? } else { 0 };
                    return Err(NetworkError::Protocol {
                        expected: parts,
                        got: received.len() + 1 + extra,
                    });
                }
            }
            None => {
                return Err(NetworkError::ReceiveFailed(format!(
                    "message on {} truncated after {} parts",
                    endpoint.describe(),
                    received.len()
                )))
            }
        }
    }

    if received.len() != parts {
        return Err(NetworkError::Protocol {
            expected: parts,
            got: received.len(),
        });
    }

    Ok(Some(received))
}

/// Send one frame and wait for exactly one single-part reply
pub async fn request_reply<E>(
    endpoint: &mut E,
    request: Bytes,
    timeout: Duration,
) -> Result<Bytes, NetworkError>
where
    E: FrameEndpoint + ?Sized,
{
    endpoint.send_frame(request).await?;

    receive_frame(endpoint, timeout)
        .await?
        .ok_or(NetworkError::Timeout(timeout.as_millis() as u64))
}
