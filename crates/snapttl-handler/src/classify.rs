//! Mapping from a snapshot outcome to what the trigger observes.
//!
//! The queue redelivers a message exactly when the invocation returns `Err`.
//!
//! | outcome            | `Acknowledge` (default)                  | `Redeliver`                 |
//! |--------------------|------------------------------------------|-----------------------------|
//! | `Success`          | 200 `Created snapshot <id> from disk <d>` | same                        |
//! | `TransportFailure` | 200 `Error create snapshot: <detail>`     | `Err(SnapshotFailed)`       |
//! | `OperationFailure` | 200 `Failed to create snapshot: <detail>` | `Err(SnapshotFailed)`       |
//!
//! Failures before the create call (event, payload, config, credentials) and
//! while waiting on the operation are always `Err`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use snapttl_core::OperationOutcome;

use crate::{HandlerError, Response};

/// What to do when the control plane refuses or fails a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the failure in a 200 response; the message is consumed.
    #[default]
    Acknowledge,
    /// Fail the invocation so the queue tries again later.
    Redeliver,
}

impl FromStr for FailurePolicy {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acknowledge" | "ack" => Ok(FailurePolicy::Acknowledge),
            "redeliver" | "retry" => Ok(FailurePolicy::Redeliver),
            other => Err(HandlerError::Config(format!(
                "unknown failure policy {other:?} (expected acknowledge or redeliver)"
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Acknowledge => f.write_str("acknowledge"),
            FailurePolicy::Redeliver => f.write_str("redeliver"),
        }
    }
}

/// Whether the queue should consider the message delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Acknowledge,
    Redeliver,
}

pub fn disposition(result: &Result<Response, HandlerError>) -> Disposition {
    match result {
        Ok(_) => Disposition::Acknowledge,
        Err(_) => Disposition::Redeliver,
    }
}

pub fn classify(
    outcome: OperationOutcome,
    policy: FailurePolicy,
) -> Result<Response, HandlerError> {
    let failure = match outcome {
        OperationOutcome::Success {
            snapshot_id,
            disk_id,
        } => {
            return Ok(Response::ok(format!(
                "Created snapshot {snapshot_id} from disk {disk_id}"
            )));
        }
        OperationOutcome::TransportFailure(detail) => format!("Error create snapshot: {detail}"),
        OperationOutcome::OperationFailure(detail) => {
            format!("Failed to create snapshot: {detail}")
        }
    };

    tracing::warn!("{} (policy: {})", failure, policy);
    match policy {
        FailurePolicy::Acknowledge => Ok(Response::ok(failure)),
        FailurePolicy::Redeliver => Err(HandlerError::SnapshotFailed(failure)),
    }
}
