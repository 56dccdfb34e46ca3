use snapttl_compute::ComputeError;
use snapttl_core::CoreError;
use thiserror::Error;

/// Every variant makes the invocation fail, which the queue answers by
/// redelivering the message.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("event carries no messages")]
    EmptyEvent,
    #[error("malformed event: {0}")]
    Event(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("credential acquisition failed: {0}")]
    Credentials(#[source] ComputeError),
    #[error("snapshot operation could not be observed: {0}")]
    Operation(#[source] ComputeError),
    #[error("snapshot creation failed: {0}")]
    SnapshotFailed(String),
}
