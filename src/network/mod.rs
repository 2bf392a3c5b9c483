//! Network subsystem: frame transport over ZeroMQ sockets

pub mod endpoint;
pub mod mock;
pub mod zmq;

pub use endpoint::{receive_frame, receive_multipart, request_reply, Frame, FrameEndpoint};
pub use mock::MockEndpoint;
pub use zmq::ZmqEndpoint;
