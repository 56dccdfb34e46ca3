use serde::{Deserialize, Serialize};

use crate::expiration::ExpirationPolicy;
use crate::labels::{expiration_labels, Labels};
use crate::naming::{describe_expiration, snapshot_name};
use crate::request::SnapshotRequest;

/// Everything submitted to the control plane for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotJob {
    pub folder_id: String,
    pub disk_id: String,
    pub name: String,
    pub description: String,
    pub labels: Labels,
}

impl SnapshotJob {
    pub fn build(request: &SnapshotRequest, expiration: &ExpirationPolicy) -> Self {
        let ts = expiration.expiration_timestamp();
        Self::with_description(request, ts, describe_expiration(ts))
    }

    pub fn with_description(
        request: &SnapshotRequest,
        expiration_timestamp: i64,
        description: String,
    ) -> Self {
        Self {
            folder_id: request.folder_id.clone(),
            disk_id: request.disk_id.clone(),
            name: snapshot_name(expiration_timestamp, &request.disk_name),
            description,
            labels: expiration_labels(expiration_timestamp),
        }
    }
}

/// How a create-snapshot attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The create call itself was rejected or never reached the service.
    TransportFailure(String),
    /// The long-running operation finished with an error.
    OperationFailure(String),
    Success { snapshot_id: String, disk_id: String },
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success { .. })
    }
}
