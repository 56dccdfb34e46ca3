//! Queue-triggered snapshot handler.
//!
//! One invocation consumes one [`MessageQueueEvent`], creates one snapshot and
//! reports the result as a [`Response`]. Whether the queue redelivers the
//! message is decided by [`classify`]; see [`Disposition`].

pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod response;

pub use classify::{classify, disposition, Disposition, FailurePolicy};
pub use config::HandlerConfig;
pub use error::HandlerError;
pub use event::MessageQueueEvent;
pub use handler::SnapshotHandler;
pub use response::Response;
