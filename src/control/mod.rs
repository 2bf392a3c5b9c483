//! Control channel: request vocabulary and dispatch

pub mod command;
pub mod dispatcher;

pub use command::{Command, Reply};
pub use dispatcher::Dispatcher;
