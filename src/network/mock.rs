//! In-memory endpoints for tests and offline runs
//!
//! A [`MockEndpoint`] is a cheap handle onto shared state: clone it, hand one
//! clone to the bridge, and keep the other to inject inbound messages and
//! inspect what was sent.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::endpoint::{Frame, FrameEndpoint};
use crate::error::NetworkError;

/// Scripted endpoint; never actually waits
#[derive(Clone)]
pub struct MockEndpoint {
    label: String,
    inner: Arc<Mutex<MockEndpointInner>>,
}

#[derive(Default)]
struct MockEndpointInner {
    inbound: VecDeque<Frame>,
    sent: Vec<Bytes>,
    /// Queued as an inbound message after every send (requester peers)
    auto_reply: Option<Bytes>,
    fail_sends: bool,
}

impl MockEndpoint {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(Mutex::new(MockEndpointInner::default())),
        }
    }

    /// Queue one inbound message made of the given parts
    pub fn push_message<I, P>(&self, parts: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Bytes>,
    {
        let parts: Vec<Bytes> = parts.into_iter().map(Into::into).collect();
        let last = parts.len().saturating_sub(1);

        let mut inner = self.inner.lock();
        for (index, data) in parts.into_iter().enumerate() {
            inner.inbound.push_back(Frame {
                data,
                more: index < last,
            });
        }
    }

    /// Queue parts whose last one still announces more to come
    pub fn push_unterminated<I, P>(&self, parts: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Bytes>,
    {
        let mut inner = self.inner.lock();
        for data in parts {
            inner.inbound.push_back(Frame {
                data: data.into(),
                more: true,
            });
        }
    }

    /// Answer every sent frame with `reply`
    pub fn reply_with(&self, reply: impl Into<Bytes>) {
        self.inner.lock().auto_reply = Some(reply.into());
    }

    /// Stop answering sent frames, as an unreachable peer would
    pub fn go_silent(&self) {
        self.inner.lock().auto_reply = None;
    }

    /// Make every subsequent send fail
    pub fn fail_sends(&self) {
        self.inner.lock().fail_sends = true;
    }

    /// All frames sent so far
    pub fn sent(&self) -> Vec<Bytes> {
        self.inner.lock().sent.clone()
    }

    /// Remove and return the frames sent so far
    pub fn take_sent(&self) -> Vec<Bytes> {
        std::mem::take(&mut self.inner.lock().sent)
    }

    /// Inbound parts not yet received
    pub fn pending_parts(&self) -> usize {
        self.inner.lock().inbound.len()
    }
}

#[async_trait]
impl FrameEndpoint for MockEndpoint {
    async fn recv_part(&mut self, _wait: Duration) -> Result<Option<Frame>, NetworkError> {
        Ok(self.inner.lock().inbound.pop_front())
    }

    async fn send_frame(&mut self, data: Bytes) -> Result<(), NetworkError> {
        let mut inner = self.inner.lock();
        if inner.fail_sends {
            return Err(NetworkError::SendFailed(format!("{} refused the frame", self.label)));
        }

        inner.sent.push(data);
        if let Some(reply) = inner.auto_reply.clone() {
            inner.inbound.push_back(Frame {
                data: reply,
                more: false,
            });
        }
        Ok(())
    }

    fn describe(&self) -> &str {
        &self.label
    }
}
