use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A job asking for one disk to be snapshotted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub folder_id: String,
    pub disk_id: String,
    pub disk_name: String,
}

impl SnapshotRequest {
    /// Decode a message body. All three keys are required; unknown keys are ignored.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(body)?)
    }
}
